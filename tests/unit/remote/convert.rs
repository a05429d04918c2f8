use super::*;

#[test]
fn convert_request_requires_file_and_sane_quality() {
    assert!(ConvertRequest::new(Vec::new(), TargetFormat::Jpeg, 1.0).is_err());
    assert!(ConvertRequest::new(vec![1, 2, 3], TargetFormat::Jpeg, 0.0).is_err());
    assert!(ConvertRequest::new(vec![1, 2, 3], TargetFormat::Jpeg, 1.5).is_err());
    assert!(ConvertRequest::new(vec![1, 2, 3], TargetFormat::Png, 1.0).is_ok());
}

#[test]
fn target_formats_report_their_content_type() {
    assert_eq!(TargetFormat::Jpeg.content_type(), "image/jpeg");
    assert_eq!(TargetFormat::Png.content_type(), "image/png");
}

#[test]
fn pdf_request_rejects_empty_page_lists() {
    assert!(PdfRequest::new(Vec::new(), PageSize::A4, PageOrientation::Portrait).is_err());
    assert!(
        PdfRequest::new(vec![Vec::new()], PageSize::A4, PageOrientation::Portrait).is_err()
    );
    assert!(
        PdfRequest::new(vec![vec![1]], PageSize::Letter, PageOrientation::Landscape).is_ok()
    );
}

#[test]
fn page_options_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&PageSize::A4).unwrap(), "\"a4\"");
    assert_eq!(
        serde_json::to_string(&PageOrientation::Landscape).unwrap(),
        "\"landscape\""
    );
}
