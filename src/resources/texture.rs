use anyhow::Context as _;
use image::RgbaImage;

#[cfg(target_arch = "wasm32")]
fn format_url(asset_root: &str, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("No browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow::anyhow!("Cannot read the page origin: {:?}", e))?;
    let root = asset_root.trim_start_matches("./").trim_end_matches('/');
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root))?;
    Ok(base.join(file_name)?)
}

/// Read an asset relative to `asset_root`.
///
/// Native builds read from disk, web builds fetch from the page origin.
pub async fn load_binary(asset_root: &str, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(asset_root, file_name)?;
        reqwest::get(url.clone())
            .await?
            .error_for_status()
            .with_context(|| format!("Fetching {}", url))?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(asset_root).join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Reading {}", path.display()))?
    };

    Ok(data)
}

/// Decode an image file of any format `image` recognises into RGBA8.
pub fn decode_rgba(bytes: &[u8], file_name: &str) -> anyhow::Result<RgbaImage> {
    let img = image::load_from_memory(bytes).with_context(|| format!("Decoding {}", file_name))?;
    Ok(img.to_rgba8())
}

pub async fn load_rgba(asset_root: &str, file_name: &str) -> anyhow::Result<RgbaImage> {
    let data = load_binary(asset_root, file_name).await?;
    decode_rgba(&data, file_name)
}

/// Load the six faces of a cube map concurrently, keeping their order.
pub async fn load_cube_faces(asset_root: &str, faces: &[String; 6]) -> anyhow::Result<Vec<RgbaImage>> {
    futures::future::try_join_all(faces.iter().map(|face| load_rgba(asset_root, face))).await
}
