//! Tests for hex parsing, color expansion and averaging.

use pixel_points::color::average_hex;
use pixel_points::{Color, ColorError, ColorKeys, average_color, similar_colors};

#[test]
fn test_hex_parsing() -> anyhow::Result<()> {
    assert_eq!(Color::from_hex("#ffc90e")?, Color::rgb(255, 201, 14));
    assert_eq!(Color::from_hex("#FFC90E")?, Color::rgb(255, 201, 14));
    assert_eq!(Color::from_hex("#fff")?, Color::from_hex("#ffffff")?);
    assert_eq!(Color::from_hex("#a1c")?, Color::rgb(0xaa, 0x11, 0xcc));
    assert_eq!("#880015".parse::<Color>()?.to_hex(), "#880015");
    Ok(())
}

#[test]
fn test_invalid_hex_codes() {
    for bad in ["red", "ffffff", "#ffff", "#fffffff", "#ggg", "#", "", "#12345z", "#ÿÿÿ"] {
        assert_eq!(
            Color::from_hex(bad),
            Err(ColorError::InvalidHex(bad.to_string())),
            "{:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_similar_colors_contain_reference() -> anyhow::Result<()> {
    for hex in ["#000000", "#ffffff", "#ffc90e", "#22b14c", "#808080"] {
        let color = Color::from_hex(hex)?;
        for threshold in [0.0, 0.5, 1.0, 5.0, 12.3] {
            let set = similar_colors(&color, threshold)?;
            assert!(set.contains(&color.channels()), "{} @ {}", hex, threshold);
        }
    }
    Ok(())
}

#[test]
fn test_similar_colors_sizes() -> anyhow::Result<()> {
    let grey = Color::rgb(128, 128, 128);
    assert_eq!(similar_colors(&grey, 0.0)?.len(), 1);
    // Center plus the six axis neighbors; diagonals are sqrt(2) away
    assert_eq!(similar_colors(&grey, 1.0)?.len(), 7);
    assert_eq!(similar_colors(&grey, 1.5)?.len(), 19);

    // Clamped at the edge of the RGB cube
    assert_eq!(similar_colors(&Color::BLACK, 1.0)?.len(), 4);
    Ok(())
}

#[test]
fn test_similar_colors_are_within_threshold() -> anyhow::Result<()> {
    let color = Color::from_hex("#ffc90e")?;
    let threshold = 5.0;
    let set = similar_colors(&color, threshold)?;
    assert!(set.iter().all(|rgb| color.distance(*rgb) <= threshold));
    // Symmetric metric
    for rgb in &set {
        let other = Color::rgb(rgb[0], rgb[1], rgb[2]);
        assert_eq!(other.distance(color.channels()), color.distance(*rgb));
    }
    Ok(())
}

#[test]
fn test_similar_colors_rejects_bad_threshold() {
    assert_eq!(
        similar_colors(&Color::BLACK, -1.0),
        Err(ColorError::InvalidThreshold(-1.0))
    );
    assert!(similar_colors(&Color::BLACK, f64::NAN).is_err());
}

#[test]
fn test_average_color() -> anyhow::Result<()> {
    let black = Color::from_hex("#000000")?;
    let white = Color::from_hex("#ffffff")?;

    assert_eq!(average_color(&[black, white], false)?.to_hex(), "#808080");
    assert_eq!(average_color(&[white], false)?, white);
    assert_eq!(average_color(&[black, white], true)?.to_hex(), "#808080ff");
    assert_eq!(average_color(&[], false), Err(ColorError::Empty));
    Ok(())
}

#[test]
fn test_average_hex_validates_entries() -> anyhow::Result<()> {
    assert_eq!(average_hex(&["#22b14c", "#b5e61d"], false)?.to_hex(), "#6ccc35");
    assert_eq!(
        average_hex(&["#22b14c", "green"], false),
        Err(ColorError::InvalidHex("green".to_string()))
    );
    Ok(())
}

#[test]
fn test_color_keys_json_keeps_order() -> anyhow::Result<()> {
    let keys = ColorKeys::from_json(
        r##"{"Zeta": ["#fff"], "Alpha": ["#000", "#111"], "Mid": ["#abcdef"]}"##,
    )?;
    let labels: Vec<&str> = keys.iter().map(|k| k.label.as_str()).collect();
    assert_eq!(labels, vec!["Zeta", "Alpha", "Mid"]);
    assert_eq!(keys.get(1).map(|k| k.colors.len()), Some(2));
    Ok(())
}

#[test]
fn test_color_keys_json_rejects_bad_hex() {
    let err = ColorKeys::from_json(r##"{"Gold": ["#ffc90e", "gold"]}"##).unwrap_err();
    assert!(
        err.to_string().contains("gold is not a valid hex color"),
        "got: {}",
        err
    );
}

#[test]
fn test_color_keys_merge_appends_colors() -> anyhow::Result<()> {
    let mut keys = ColorKeys::from_hex_map([("A", ["#000"])])?;
    keys.merge(ColorKeys::from_hex_map([("B", ["#fff"]), ("A", ["#111"])])?);
    assert_eq!(keys.len(), 2);
    assert_eq!(keys.get(0).map(|k| k.colors.len()), Some(2));
    Ok(())
}
