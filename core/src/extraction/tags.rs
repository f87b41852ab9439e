use dicom_core::dictionary::{DataDictionary, DataDictionaryEntry};
use dicom_core::Tag;
use dicom_dictionary_std::StandardDataDictionary;
use dicom_object::InMemDicomObject;

// Identification Tags
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
pub const INSTANCE_NUMBER: Tag = Tag(0x0020, 0x0013);

// Core Image Tags
pub const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
pub const COMPLEX_IMAGE_COMPONENT: Tag = Tag(0x0008, 0x9208);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);

// Image Pixel Tags
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
pub const HIGH_BIT: Tag = Tag(0x0028, 0x0102);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// VOI LUT Tags
pub const WINDOW_CENTER: Tag = Tag(0x0028, 0x1050);
pub const WINDOW_WIDTH: Tag = Tag(0x0028, 0x1051);
pub const FRAME_VOI_LUT_SEQUENCE: Tag = Tag(0x0028, 0x9132);

// Timing Tags
pub const ACQUISITION_DATE_TIME: Tag = Tag(0x0008, 0x002A);
pub const TRIGGER_TIME: Tag = Tag(0x0018, 0x1060);
pub const CARDIAC_SYNCHRONIZATION_SEQUENCE: Tag = Tag(0x0018, 0x9118);
pub const NOMINAL_CARDIAC_TRIGGER_DELAY_TIME: Tag = Tag(0x0020, 0x9153);

// Functional Group Tags
pub const PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9230);

/// UID root shared by every Softcopy Presentation State Storage SOP class
pub const PRESENTATION_STATE_SOP_CLASS_ROOT: &str = "1.2.840.10008.5.1.4.1.1.11.";

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim_end_matches('\0').trim().to_string())
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Checks whether a dataset is a presentation state rather than an image
pub fn is_presentation_state(dcm: &InMemDicomObject) -> bool {
    get_string_value(dcm, SOP_CLASS_UID)
        .is_some_and(|uid| uid.starts_with(PRESENTATION_STATE_SOP_CLASS_ROOT))
}

/// Renders a tag path with dictionary keywords, e.g.
/// `PerFrameFunctionalGroupsSequence/FrameVOILUTSequence/WindowCenter`
pub fn describe_path(path: &[Tag]) -> String {
    path.iter()
        .map(|tag| match StandardDataDictionary.by_tag(*tag) {
            Some(entry) => entry.alias().to_string(),
            None => format!("{}", tag),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    #[test]
    fn test_tag_values() {
        // Just ensure tags are correctly defined
        assert_eq!(IMAGE_TYPE, Tag(0x0008, 0x0008));
        assert_eq!(SERIES_INSTANCE_UID, Tag(0x0020, 0x000E));
        assert_eq!(WINDOW_CENTER, Tag(0x0028, 0x1050));
        assert_eq!(PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE, Tag(0x5200, 0x9230));
        assert_eq!(NOMINAL_CARDIAC_TRIGGER_DELAY_TIME, Tag(0x0020, 0x9153));
    }

    #[test]
    fn test_describe_path() {
        assert_eq!(
            describe_path(&[
                PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE,
                FRAME_VOI_LUT_SEQUENCE,
                WINDOW_CENTER
            ]),
            "PerFrameFunctionalGroupsSequence/FrameVOILUTSequence/WindowCenter"
        );
    }

    #[test]
    fn test_presentation_state_detection() {
        let mut dcm = InMemDicomObject::new_empty();
        assert!(!is_presentation_state(&dcm));

        // Grayscale Softcopy Presentation State Storage
        dcm.put(DataElement::new(
            SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from("1.2.840.10008.5.1.4.1.1.11.1"),
        ));
        assert!(is_presentation_state(&dcm));

        // Enhanced MR Image Storage
        dcm.put(DataElement::new(
            SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from("1.2.840.10008.5.1.4.1.1.4.1"),
        ));
        assert!(!is_presentation_state(&dcm));
    }

    #[test]
    fn test_string_value_trims_padding() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            SERIES_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.3\0"),
        ));
        assert_eq!(
            get_string_value(&dcm, SERIES_INSTANCE_UID).as_deref(),
            Some("1.2.3")
        );
        assert_eq!(get_int_value(&dcm, INSTANCE_NUMBER), None);
    }
}
