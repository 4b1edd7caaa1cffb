#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use pixkit::{
    models::AppConfig,
    services::background::{BackgroundRemover, RemovalError},
};
use reqwest::multipart;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("pixkit=debug")
            .with_test_writer()
            .try_init();
    });
}

/// A segmentation backend that always fails, for exercising the error path.
#[derive(Debug, Default)]
pub struct FailingRemover;

#[async_trait]
impl BackgroundRemover for FailingRemover {
    async fn remove(&self, _input: Vec<u8>) -> Result<Vec<u8>, RemovalError> {
        Err(RemovalError::Backend {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "model not loaded".to_string(),
        })
    }
}

/// A running server plus the temporary directories it owns.
///
/// Dropping it removes the Storage Area and template directory.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub storage_dir: TempDir,
    pub template_dir: TempDir,
}

impl TestApp {
    /// Names currently in the Storage Area, sorted.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.storage_dir.path())
            .expect("Failed to read storage dir")
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    pub fn storage_path(&self) -> &Path {
        self.storage_dir.path()
    }

    pub async fn upload(&self, route: &str, file_name: &str, data: Vec<u8>) -> reqwest::Response {
        let part = multipart::Part::bytes(data).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        self.client
            .post(format!("{}{route}", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute upload request")
    }

    /// Uploads `data` and returns the stored file name, asserting success.
    pub async fn upload_ok(&self, route: &str, file_name: &str, data: Vec<u8>) -> String {
        let response = self.upload(route, file_name, data).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["filename"].as_str().unwrap().to_string()
    }

    pub async fn post_json(&self, route: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{route}", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, route: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{route}", self.address))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Fetches a stored file through `/image/{filename}` and decodes it.
    pub async fn fetch_image(&self, filename: &str) -> DynamicImage {
        let response = self.get(&format!("/image/{filename}")).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let bytes = response.bytes().await.unwrap();
        image::load_from_memory(&bytes).expect("Served file is not a valid image")
    }
}

/// Spawns the application over fresh temporary directories.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}, None).await
}

pub async fn spawn_app_with_remover(remover: Arc<dyn BackgroundRemover>) -> TestApp {
    spawn_app_with(|_| {}, Some(remover)).await
}

/// Spawns the application after letting the caller adjust its configuration.
pub async fn spawn_app_with(
    configure: impl FnOnce(&mut AppConfig),
    remover: Option<Arc<dyn BackgroundRemover>>,
) -> TestApp {
    init_tracing_once();

    let storage_dir = TempDir::new().expect("Failed to create storage dir");
    let template_dir = TempDir::new().expect("Failed to create template dir");

    let mut config = AppConfig::with_upload_dir(storage_dir.path());
    config.template_dir = template_dir.path().to_path_buf();
    configure(&mut config);

    let app = pixkit::app_with_remover(config, remover)
        .await
        .expect("Failed to build app");

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");

    // Wait for server to be ready
    let client = reqwest::Client::new();
    for _ in 0..10 {
        if client
            .get(format!("{address}/health"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    TestApp {
        address,
        client,
        storage_dir,
        template_dir,
    }
}

/// An opaque image whose every pixel is distinct along both axes.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

/// An opaque red quadrant on a transparent canvas.
pub fn transparent_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if x < width / 2 && y < height / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Pseudo-random pixels, which PNG cannot compress much.
pub fn noise_image(width: u32, height: u32) -> RgbImage {
    let mut seed: u32 = 0x9E37_79B9;
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (seed >> 24) as u8
        };
        Rgb([next(), next(), next()])
    })
}

/// A subject in the middle of a uniform green backdrop.
pub fn subject_on_backdrop(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let centred = x > width / 4 && x < width * 3 / 4 && y > height / 4 && y < height * 3 / 4;
        if centred {
            Rgb([200, 30, 40])
        } else {
            Rgb([20, 180, 60])
        }
    })
}

pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("Failed to encode test image");
    buffer
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(gradient_image(width, height)),
        ImageFormat::Png,
    )
}
