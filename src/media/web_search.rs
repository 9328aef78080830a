//! Web image search: Pixabay first, then Unsplash and Picsum.
//!
//! Pixabay hits come back in relevance order and are offered first. The two
//! fallbacks are URLs that redirect to a photo; they are appended so the
//! operator still has something to pick when Pixabay has no key or no hits.
//! Picsum ignores the search term entirely, which is why it comes last.

use super::backend::{ImageCandidate, ImageSearch, MediaError};
use crate::config::ImagesConfig;
use crate::naming::media_filename_keyed;
use image::ImageFormat;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

const PIXABAY_ENDPOINT: &str = "https://pixabay.com/api/";
const UNSPLASH_ENDPOINT: &str = "https://source.unsplash.com/400x300/";
const PICSUM_URL: &str = "https://picsum.photos/400/300";
const PIXABAY_KEY_ENV: &str = "PIXABAY_API_KEY";

#[derive(Debug, Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    #[serde(rename = "webformatURL")]
    webformat_url: String,
}

/// Build the blocking HTTP client shared by the web collaborators.
pub fn http_client(timeout_secs: u64) -> Result<Client, MediaError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("wordflash/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

pub struct WebImageSearch {
    client: Client,
    api_key: Option<String>,
    per_page: u32,
    fallbacks: bool,
}

impl WebImageSearch {
    pub fn new(client: Client, config: &ImagesConfig) -> Self {
        let api_key = std::env::var(PIXABAY_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| config.pixabay_key.clone());
        if api_key.is_none() {
            log::info!("No Pixabay key configured; only fallback images will be offered");
        }
        Self {
            client,
            api_key,
            per_page: config.per_page,
            fallbacks: config.fallbacks,
        }
    }

    fn pixabay(&self, key: &str, term: &str) -> Result<Vec<ImageCandidate>, MediaError> {
        let per_page = self.per_page.to_string();
        let response: PixabayResponse = self
            .client
            .get(PIXABAY_ENDPOINT)
            .query(&[
                ("key", key),
                ("q", term),
                ("image_type", "photo"),
                ("category", "all"),
                ("min_width", "400"),
                ("per_page", per_page.as_str()),
                ("safesearch", "true"),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response
            .hits
            .into_iter()
            .map(|hit| ImageCandidate::new(hit.webformat_url))
            .collect())
    }
}

impl ImageSearch for WebImageSearch {
    fn search(&self, term: &str) -> Result<Vec<ImageCandidate>, MediaError> {
        let mut candidates = Vec::new();
        if let Some(key) = &self.api_key {
            match self.pixabay(key, term) {
                Ok(hits) => candidates.extend(hits),
                // Fallbacks can still serve the entry.
                Err(e) if self.fallbacks => log::warn!("Pixabay search for '{}' failed: {}", term, e),
                Err(e) => return Err(e),
            }
        }
        if self.fallbacks {
            candidates.extend(fallback_candidates(term));
        }
        Ok(candidates)
    }

    fn download(
        &self,
        candidate: &ImageCandidate,
        term: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, MediaError> {
        let bytes = self
            .client
            .get(&candidate.source_url)
            .send()?
            .error_for_status()?
            .bytes()?;
        store_image(&bytes, dest_dir, term, &candidate.source_url)
    }
}

/// Unsplash (term-based) and Picsum (random) candidates.
pub fn fallback_candidates(term: &str) -> Vec<ImageCandidate> {
    let query: String = term
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(",");
    let mut candidates = Vec::new();
    match Url::parse(UNSPLASH_ENDPOINT) {
        Ok(mut url) => {
            url.set_query(Some(&query));
            candidates.push(ImageCandidate::new(url.as_str()));
        }
        Err(e) => log::warn!("Bad Unsplash endpoint {}: {}", UNSPLASH_ENDPOINT, e),
    }
    candidates.push(ImageCandidate::new(PICSUM_URL));
    candidates
}

/// Verify `bytes` decode as an image and write them under a content-derived name.
///
/// The fallback URLs serve a different picture on every request, so the
/// name is keyed by the bytes rather than the URL; two different pictures
/// for one term never share a file. The extension follows the sniffed
/// format, not the URL, since image services happily serve WebP from `.jpg`
/// paths.
pub fn store_image(
    bytes: &[u8],
    dest_dir: &Path,
    term: &str,
    key: &str,
) -> Result<PathBuf, MediaError> {
    if bytes.is_empty() {
        return Err(MediaError::EmptyResponse(key.to_string()));
    }
    let format = image::guess_format(bytes)
        .map_err(|e| MediaError::NotAnImage(format!("{key}: {e}")))?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| MediaError::NotAnImage(format!("{key}: {e}")))?;
    let extension = match format {
        ImageFormat::Jpeg => "jpg",
        other => other.extensions_str().first().copied().unwrap_or("img"),
    };
    let digest = format!("{:x}", Sha256::digest(bytes));
    let path = dest_dir.join(media_filename_keyed(term, &digest, extension));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([200, 10, 10]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn fallbacks_put_term_first_and_random_last() {
        let candidates = fallback_candidates("red apple");
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].source_url.ends_with("?red,apple"));
        assert_eq!(candidates[1].source_url, PICSUM_URL);
    }

    #[test]
    fn fallback_query_is_url_encoded() {
        let candidates = fallback_candidates("Käse  Brot");
        assert!(candidates[0].source_url.ends_with("?K%C3%A4se,Brot"));
    }

    #[test]
    fn same_url_different_pictures_get_different_files() {
        let tmp = TempDir::new().unwrap();
        let red = png_bytes();
        let blue = {
            let img = image::RgbImage::from_pixel(4, 3, image::Rgb([10, 10, 200]));
            let mut buf = Cursor::new(Vec::new());
            img.write_to(&mut buf, ImageFormat::Png).unwrap();
            buf.into_inner()
        };
        let first = store_image(&red, tmp.path(), "dog", PICSUM_URL).unwrap();
        let second = store_image(&blue, tmp.path(), "dog", PICSUM_URL).unwrap();
        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), red);
        assert_eq!(std::fs::read(&second).unwrap(), blue);

        let again = store_image(&red, tmp.path(), "dog", "https://other/url.jpg").unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn store_image_writes_sniffed_extension() {
        let tmp = TempDir::new().unwrap();
        let path = store_image(&png_bytes(), tmp.path(), "apple", "https://x/1.jpg").unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "png");
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("apple_"));
    }

    #[test]
    fn store_image_rejects_html() {
        let tmp = TempDir::new().unwrap();
        let result = store_image(b"<html>rate limited</html>", tmp.path(), "apple", "u");
        assert!(matches!(result, Err(MediaError::NotAnImage(_))));
    }

    #[test]
    fn store_image_rejects_truncated_image() {
        let tmp = TempDir::new().unwrap();
        let bytes = png_bytes();
        let result = store_image(&bytes[..20], tmp.path(), "apple", "u");
        assert!(matches!(result, Err(MediaError::NotAnImage(_))));
    }

    #[test]
    fn store_image_rejects_empty_body() {
        let tmp = TempDir::new().unwrap();
        let result = store_image(&[], tmp.path(), "apple", "u");
        assert!(matches!(result, Err(MediaError::EmptyResponse(_))));
    }

    #[test]
    fn pixabay_response_parses_hits() {
        let json = r#"{"total": 2, "hits": [
            {"id": 1, "webformatURL": "https://pixabay.com/get/a.jpg", "tags": "dog"},
            {"id": 2, "webformatURL": "https://pixabay.com/get/b.jpg", "tags": "dog"}
        ]}"#;
        let response: PixabayResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[1].webformat_url, "https://pixabay.com/get/b.jpg");
    }

    #[test]
    #[ignore] // Requires network access
    fn live_search_offers_fallbacks() {
        let client = http_client(10).unwrap();
        let search = WebImageSearch::new(client, &ImagesConfig::default());
        let results = search.search("dog").unwrap();
        assert!(results.len() >= 2);
    }
}
