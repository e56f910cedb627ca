//! Browser print tests: loads generated print documents in headless Chrome.
//!
//! Run with: `cargo test --test browser_print -- --ignored`

use headless_chrome::{Browser, LaunchOptions, Tab};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn generated_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/browser/generated")
}

/// Six 300x200 PNGs under the generated directory.
fn fixture_images() -> Vec<PathBuf> {
    let dir = generated_dir().join("images");
    std::fs::create_dir_all(&dir).expect("failed to create image dir");
    (1..=6)
        .map(|i| {
            let path = dir.join(format!("{i:02}.png"));
            DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, image::Rgb([i * 40, 80, 160])))
                .save_with_format(&path, ImageFormat::Png)
                .expect("failed to write fixture image");
            path
        })
        .collect()
}

fn ensure_documents_built() {
    static BUILT: OnceLock<()> = OnceLock::new();
    BUILT.get_or_init(|| {
        let output_dir = generated_dir();
        if output_dir.exists() {
            std::fs::remove_dir_all(&output_dir).expect("failed to clean output dir");
        }
        let images = fixture_images();
        build_document("grid", &output_dir.join("grid.html"), &images);
        build_document("flow", &output_dir.join("flow.html"), &images);
    });
}

fn build_document(policy: &str, output: &Path, images: &[PathBuf]) {
    let status = Command::new(env!("CARGO_BIN_EXE_printify"))
        .args(["--policy", policy])
        .arg("--output")
        .arg(output)
        .arg("print")
        .args(images)
        .status()
        .expect("failed to run printify");
    assert!(status.success(), "{policy} document generation failed");
}

fn browser() -> &'static Browser {
    static B: OnceLock<Browser> = OnceLock::new();
    B.get_or_init(|| {
        Browser::new(LaunchOptions {
            window_size: Some((1280, 800)),
            ..Default::default()
        })
        .expect("failed to launch Chrome")
    })
}

fn load(name: &str) -> Arc<Tab> {
    ensure_documents_built();
    let tab = browser().new_tab().unwrap();
    let file = generated_dir().join(name);
    assert!(file.exists(), "missing: {}", file.display());

    tab.navigate_to(&format!("file://{}", file.display()))
        .unwrap()
        .wait_until_navigated()
        .unwrap();
    tab
}

fn eval_f64(tab: &Tab, js: &str) -> f64 {
    tab.evaluate(js, false)
        .expect("failed to evaluate JS")
        .value
        .expect("no value returned")
        .as_f64()
        .expect("value is not a number")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn grid_document_has_two_pages_of_four() {
    let tab = load("grid.html");
    let pages = eval_f64(&tab, "document.querySelectorAll('.print-page').length");
    assert_eq!(pages, 2.0);
    let first = eval_f64(
        &tab,
        "document.querySelectorAll('.print-page')[0].querySelectorAll('.tile').length",
    );
    assert_eq!(first, 4.0);
}

#[test]
#[ignore]
fn grid_print_view_is_hidden_on_screen() {
    let tab = load("grid.html");
    let val = tab
        .evaluate(
            "getComputedStyle(document.querySelector('.print-view')).display",
            false,
        )
        .expect("failed to evaluate JS")
        .value
        .expect("no value returned");
    assert_eq!(val.as_str(), Some("none"));
}

#[test]
#[ignore]
fn flow_pages_have_fixed_height() {
    let tab = load("flow.html");
    let pages = eval_f64(&tab, "document.querySelectorAll('.print-page').length");
    // six 200px tiles: five fit in 1123px, the sixth starts a new page
    assert_eq!(pages, 2.0);
    let height = eval_f64(
        &tab,
        "document.querySelector('.print-page').getBoundingClientRect().height",
    );
    assert_eq!(height, 1123.0);
}

#[test]
#[ignore]
fn embedded_images_decode() {
    let tab = load("flow.html");
    let loaded = eval_f64(
        &tab,
        "Array.from(document.images).filter(i => i.complete && i.naturalWidth === 300).length",
    );
    assert_eq!(loaded, 6.0);
}
