use super::*;

#[test]
fn fps_new_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(30, 1).unwrap().as_f64(), 30.0);
}

#[test]
fn fps_frames_to_secs_uses_rational() {
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frames_to_secs(90) - 3.0).abs() < 1e-9);
    assert_eq!(fps.to_string(), "30/1");
}

#[test]
fn rgb8_parses_hex_with_and_without_hash() {
    assert_eq!(Rgb8::from_hex("#ff0000").unwrap(), Rgb8::new(255, 0, 0));
    assert_eq!(Rgb8::from_hex("0A0b0C").unwrap(), Rgb8::new(10, 11, 12));
    assert!(Rgb8::from_hex("#fff").is_err());
    assert!(Rgb8::from_hex("#gg0000").is_err());
}

#[test]
fn rgb8_serde_accepts_hex_and_array() {
    let c: Rgb8 = serde_json::from_value(serde_json::json!("#0000ff")).unwrap();
    assert_eq!(c, Rgb8::new(0, 0, 255));

    let c: Rgb8 = serde_json::from_value(serde_json::json!([1, 2, 3])).unwrap();
    assert_eq!(c, Rgb8::new(1, 2, 3));

    assert_eq!(
        serde_json::to_value(Rgb8::new(255, 128, 0)).unwrap(),
        serde_json::json!("#ff8000")
    );
}
