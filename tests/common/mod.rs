use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use enclave_algo::common::config::AppConfig;
use enclave_algo::inference::{LinearClassifier, LinearModel};
use enclave_algo::sandbox::{serve, SandboxState};

/// Start a sandbox over `data_dir` on an ephemeral port.
pub async fn start_sandbox(data_dir: &Path) -> (Arc<SandboxState>, SocketAddr) {
    let state = Arc::new(SandboxState::new(data_dir));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let served = state.clone();
    tokio::spawn(async move {
        let _ = serve(listener, served).await;
    });

    (state, addr)
}

/// Configuration pointing at a sandbox, with the schema looked up in `scratch`.
pub fn config_for(addr: SocketAddr, scratch: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.enclave.url = format!("http://{}/", addr);
    config.enclave.timeout_secs = 5;
    config.validation.schema_path = scratch.join("schema.json");
    config
}

pub fn gray_png(value: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(16, 16, Rgb([value, value, value]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn write_blob(data_dir: &Path, name: &str, bytes: &[u8]) {
    let path = data_dir.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// Bright images are predicted covid, dark ones nofinding.
pub fn brightness_model() -> LinearModel {
    LinearModel {
        labels: vec!["covid".into(), "nofinding".into(), "pneumonia".into()],
        input_size: 2,
        weights: vec![vec![1.0; 4], vec![-1.0; 4], vec![0.0; 4]],
        bias: vec![-2.0, 2.0, -5.0],
    }
}

pub fn brightness_classifier() -> LinearClassifier {
    LinearClassifier::from_model(brightness_model()).unwrap()
}
