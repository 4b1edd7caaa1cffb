use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbImage};
use pixkit::{
    models::{CropArea, Dimensions, Flips},
    services::{
        background::BorderKeyRemover,
        storage::{LocalStorage, Storage},
        transform::{CropRect, ImageTransformer, ThumbnailSize, TransformError},
    },
};
use tempfile::TempDir;

const BOUNDS: Dimensions = Dimensions {
    width: 100,
    height: 80,
};

fn rect(x: i64, y: i64, width: i64, height: i64) -> CropRect {
    CropRect {
        x,
        y,
        width,
        height,
    }
}

async fn transformer_with(
    source: &str,
    image: DynamicImage,
) -> (ImageTransformer, Arc<LocalStorage>, TempDir) {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());

    let mut data = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    storage.put(source, &data).await.unwrap();

    let transformer = ImageTransformer::new(
        Arc::clone(&storage) as Arc<dyn Storage>,
        Arc::new(BorderKeyRemover::default()),
    );
    (transformer, storage, dir)
}

#[test]
fn crop_rect_inside_bounds_is_accepted() {
    assert_eq!(
        rect(10, 10, 50, 50).within(BOUNDS),
        Some(CropArea {
            x: 10,
            y: 10,
            width: 50,
            height: 50
        })
    );
    assert!(rect(0, 0, 100, 80).within(BOUNDS).is_some());
    assert!(rect(99, 79, 1, 1).within(BOUNDS).is_some());
}

#[test]
fn crop_rect_past_any_edge_is_rejected() {
    assert_eq!(rect(60, 0, 50, 50).within(BOUNDS), None);
    assert_eq!(rect(0, 40, 10, 41).within(BOUNDS), None);
    assert_eq!(rect(-1, 0, 10, 10).within(BOUNDS), None);
    assert_eq!(rect(0, -1, 10, 10).within(BOUNDS), None);
    assert_eq!(rect(i64::MAX, 0, 1, 1).within(BOUNDS), None);
}

#[test]
fn thumbnail_size_bounds() {
    assert!(ThumbnailSize::new(Some(1), Some(1)).is_ok());
    assert_eq!(
        ThumbnailSize::new(Some(2000), Some(2000)).unwrap().dimensions(),
        Dimensions {
            width: 2000,
            height: 2000
        }
    );

    let invalid = [
        (None, Some(10)),
        (Some(10), None),
        (Some(0), Some(10)),
        (Some(10), Some(-1)),
    ];
    for (width, height) in invalid {
        assert!(matches!(
            ThumbnailSize::new(width, height),
            Err(TransformError::InvalidParameters("Invalid dimensions provided"))
        ));
    }

    assert!(matches!(
        ThumbnailSize::new(Some(10), Some(2001)),
        Err(TransformError::InvalidParameters(
            "Maximum dimensions are 2000x2000 pixels"
        ))
    ));
}

#[tokio::test]
async fn transforms_never_modify_their_source() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(30, 20, |x, y| {
        image::Rgb([x as u8 * 8, y as u8 * 12, 7])
    }));
    let (transformer, storage, _dir) = transformer_with("src.png", image).await;
    let before = storage.get("src.png").await.unwrap();

    transformer.crop("src.png", rect(1, 1, 5, 5)).await.unwrap();
    transformer
        .flip(
            "src.png",
            Flips {
                horizontal: true,
                vertical: true,
            },
        )
        .await
        .unwrap();
    transformer
        .thumbnail("src.png", ThumbnailSize::new(Some(7), Some(9)).unwrap())
        .await
        .unwrap();
    transformer.remove_background("src.png").await.unwrap();

    assert_eq!(storage.get("src.png").await.unwrap(), before);

    let mut names = storage.list().await.unwrap();
    names.sort();
    assert_eq!(
        names,
        vec![
            "src.png",
            "src_cropped.png",
            "src_flipped.png",
            "src_no_bg.png",
            "src_thumbnail_7x9.png",
        ]
    );
}

#[tokio::test]
async fn undecodable_source_is_a_decode_failure() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
    storage.put("broken.png", b"not an image").await.unwrap();
    let transformer = ImageTransformer::new(storage, Arc::new(BorderKeyRemover::default()));

    let result = transformer.flip("broken.png", Flips::default()).await;

    assert!(matches!(result, Err(TransformError::DecodeFailure(_))));
}

#[tokio::test]
async fn unknown_and_invalid_sources_are_distinguished() {
    let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
    let (transformer, _storage, _dir) = transformer_with("a.png", image).await;

    assert!(matches!(
        transformer.flip("missing.png", Flips::default()).await,
        Err(TransformError::NotFound)
    ));
    assert!(matches!(
        transformer.flip("../a.png", Flips::default()).await,
        Err(TransformError::InvalidName)
    ));
}
