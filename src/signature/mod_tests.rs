#[cfg(test)]
mod tests {
    use crate::participant::ParticipantRecord;
    use crate::signature::{SignatureError, SignatureStore};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn record(name: &str) -> ParticipantRecord {
        ParticipantRecord::new(name, "", "", "ERASMUS", "")
    }

    #[test]
    fn test_save_rgba_flattens_transparent_pixels() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path().join("signatures"));

        // one opaque black pixel, one fully transparent pixel
        let rgba = vec![0, 0, 0, 255, 0, 0, 0, 0];
        let path = store.save_rgba("Süeda Barut", 2, 1, rgba).unwrap();

        assert_eq!(path.file_name().unwrap(), "Süeda_Barut.png");
        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(saved.get_pixel(1, 0).0, [255, 255, 255]);
        assert!(store.has_signed("Süeda Barut"));
    }

    #[test]
    fn test_save_rgba_rejects_wrong_buffer_length() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        let result = store.save_rgba("Max", 2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(SignatureError::BufferSize { expected: 16, actual: 15, .. })
        ));
        assert!(matches!(
            store.save_rgba("Max", 0, 2, Vec::new()),
            Err(SignatureError::EmptyImage)
        ));
    }

    #[test]
    fn test_save_rgba_rejects_overflowing_dimensions() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        let result = store.save_rgba("Max", u32::MAX, u32::MAX, vec![0; 4]);
        assert!(matches!(
            result,
            Err(SignatureError::BufferSize { actual: 4, .. })
        ));
        assert!(!store.has_signed("Max"));
    }

    #[test]
    fn test_name_without_usable_characters_is_rejected() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        let result = store.save_rgba("!!!", 1, 1, vec![0, 0, 0, 255]);
        assert!(matches!(result, Err(SignatureError::InvalidName(_))));
    }

    #[test]
    fn test_save_png_from_upload() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        let mut png = Vec::new();
        RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        store.save_png("Max Mustermann", &png).unwrap();
        let loaded = store.load("Max Mustermann").unwrap().unwrap();
        let decoded = image::load_from_memory(&loaded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 2));

        assert!(matches!(
            store.save_png("Max Mustermann", b"not an image"),
            Err(SignatureError::Decode(_))
        ));
    }

    #[test]
    fn test_unsigned_names_are_sorted_and_unique() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());
        store.save_rgba("Anna Schmidt", 1, 1, vec![0, 0, 0, 255]).unwrap();

        let participants = vec![
            record("Zoe Keller"),
            record("Anna Schmidt"),
            record(""),
            record("Ben Ito"),
            record("Zoe Keller"),
        ];
        assert_eq!(store.unsigned_names(&participants), vec!["Ben Ito", "Zoe Keller"]);
    }

    #[test]
    fn test_load_missing_signature() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());
        assert!(store.load("Nobody").unwrap().is_none());
        assert!(!store.has_signed("Nobody"));
    }
}
