//! In-memory DICOM fixtures shared by the unit tests.

use dicom_core::value::DataSetSequence;
use dicom_core::{dicom_value, DataElement, PrimitiveValue, Tag, VR};
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::{DefaultDicomObject, InMemDicomObject};

use crate::extraction::tags::{
    ACQUISITION_DATE_TIME, BITS_ALLOCATED, BITS_STORED, CARDIAC_SYNCHRONIZATION_SEQUENCE,
    COLUMNS, FRAME_VOI_LUT_SEQUENCE, HIGH_BIT, INSTANCE_NUMBER,
    NOMINAL_CARDIAC_TRIGGER_DELAY_TIME, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
    PHOTOMETRIC_INTERPRETATION, PIXEL_DATA, PIXEL_REPRESENTATION, ROWS, SAMPLES_PER_PIXEL,
    SERIES_INSTANCE_UID, SOP_CLASS_UID, SOP_INSTANCE_UID, WINDOW_CENTER, WINDOW_WIDTH,
};

pub const MR_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.4";
pub const GRAYSCALE_PRESENTATION_STATE: &str = "1.2.840.10008.5.1.4.1.1.11.1";

/// Minimal single channel image dataset belonging to `series_uid`
pub fn image(series_uid: &str) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    put_str(&mut obj, SOP_CLASS_UID, VR::UI, MR_IMAGE_STORAGE);
    put_str(&mut obj, SERIES_INSTANCE_UID, VR::UI, series_uid);
    put_u16(&mut obj, SAMPLES_PER_PIXEL, 1);
    put_u16(&mut obj, ROWS, 2);
    put_u16(&mut obj, COLUMNS, 2);
    put_u16(&mut obj, BITS_STORED, 12);
    obj
}

/// Image dataset with acquisition time and instance number set
pub fn timed_image(series_uid: &str, acquired: &str, instance: i32) -> InMemDicomObject {
    let mut obj = image(series_uid);
    put_str(&mut obj, ACQUISITION_DATE_TIME, VR::DT, acquired);
    put_str(&mut obj, INSTANCE_NUMBER, VR::IS, &instance.to_string());
    obj
}

pub fn put_str(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

pub fn put_strs(obj: &mut InMemDicomObject, tag: Tag, vr: VR, values: &[&str]) {
    obj.put(DataElement::new(
        tag,
        vr,
        PrimitiveValue::Strs(values.iter().map(|s| s.to_string()).collect()),
    ));
}

pub fn put_u16(obj: &mut InMemDicomObject, tag: Tag, value: u16) {
    obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

/// Zero-length element, as type 2 attributes are often written
pub fn put_empty(obj: &mut InMemDicomObject, tag: Tag, vr: VR) {
    obj.put(DataElement::new(tag, vr, PrimitiveValue::Empty));
}

pub fn put_items(obj: &mut InMemDicomObject, tag: Tag, items: Vec<InMemDicomObject>) {
    obj.put(DataElement::new(tag, VR::SQ, DataSetSequence::from(items)));
}

/// Adds native 12-bit MONOCHROME2 pixel data for the 2x2 fixture image
pub fn with_pixels(mut obj: InMemDicomObject, values: [u16; 4]) -> InMemDicomObject {
    put_str(&mut obj, PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2");
    put_u16(&mut obj, BITS_ALLOCATED, 16);
    put_u16(&mut obj, BITS_STORED, 12);
    put_u16(&mut obj, HIGH_BIT, 11);
    put_u16(&mut obj, PIXEL_REPRESENTATION, 0);
    obj.put(DataElement::new(
        PIXEL_DATA,
        VR::OW,
        dicom_value!(U16, [values[0], values[1], values[2], values[3]]),
    ));
    obj
}

/// Adds a per-frame functional group with a FrameVOILUTSequence per frame
pub fn put_frame_windows(obj: &mut InMemDicomObject, windows: &[(&str, &str)]) {
    let frames = windows
        .iter()
        .map(|(center, width)| {
            let mut voi = InMemDicomObject::new_empty();
            put_str(&mut voi, WINDOW_CENTER, VR::DS, center);
            put_str(&mut voi, WINDOW_WIDTH, VR::DS, width);
            let mut frame = InMemDicomObject::new_empty();
            put_items(&mut frame, FRAME_VOI_LUT_SEQUENCE, vec![voi]);
            frame
        })
        .collect();
    put_items(obj, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, frames);
}

/// Adds a per-frame functional group with a cardiac trigger delay per frame
pub fn put_frame_trigger_delays(obj: &mut InMemDicomObject, delays: &[f64]) {
    let frames = delays
        .iter()
        .map(|delay| {
            let mut sync = InMemDicomObject::new_empty();
            sync.put(DataElement::new(
                NOMINAL_CARDIAC_TRIGGER_DELAY_TIME,
                VR::FD,
                PrimitiveValue::from(*delay),
            ));
            let mut frame = InMemDicomObject::new_empty();
            put_items(&mut frame, CARDIAC_SYNCHRONIZATION_SEQUENCE, vec![sync]);
            frame
        })
        .collect();
    put_items(obj, PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, frames);
}

/// Wraps a dataset into a file object with an explicit VR little endian meta group
pub fn file_object(obj: InMemDicomObject, instance_uid: &str) -> DefaultDicomObject {
    let mut obj = obj;
    put_str(&mut obj, SOP_INSTANCE_UID, VR::UI, instance_uid);
    let sop_class = crate::extraction::tags::get_string_value(&obj, SOP_CLASS_UID)
        .unwrap_or_else(|| MR_IMAGE_STORAGE.to_string());
    obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax("1.2.840.10008.1.2.1")
            .media_storage_sop_class_uid(sop_class)
            .media_storage_sop_instance_uid(instance_uid),
    )
    .expect("valid file meta group")
}

/// Wraps several datasets, numbering their SOP instance UIDs
pub fn file_objects(objs: Vec<InMemDicomObject>) -> Vec<DefaultDicomObject> {
    objs.into_iter()
        .enumerate()
        .map(|(i, obj)| file_object(obj, &format!("1.2.826.0.1.{}", i + 1)))
        .collect()
}
