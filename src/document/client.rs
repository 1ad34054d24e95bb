// src/document/client.rs
use std::path::Path;
use std::time::Duration;

use reqwest::header;

use super::{html, Document};
use crate::utils::error::ConvertError;

const CONVERTER_USER_AGENT: &str = concat!("docform_extractor/", env!("CARGO_PKG_VERSION"));
// Large office documents can take a while to render server-side
const CONVERTER_TIMEOUT_SECS: u64 = 120;

/// Creates a reqwest client configured for the document converter.
fn build_converter_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(CONVERTER_USER_AGENT)
        .timeout(Duration::from_secs(CONVERTER_TIMEOUT_SECS))
        .build()
}

/// Sends raw document bytes to an external converter and turns the answer into blocks.
/// The converter may answer with a JSON block list or with HTML.
pub async fn convert_remote(url: &str, file_name: &str, bytes: Vec<u8>) -> Result<Document, ConvertError> {
    let client = build_converter_client()?;

    tracing::info!("Converting '{}' ({} bytes) via {}", file_name, bytes.len(), url);

    let response = client
        .post(url)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::ACCEPT, "application/json,text/html;q=0.9")
        .header("X-File-Name", file_name)
        .body(bytes)
        .send()
        .await?; // Propagates reqwest::Error as ConvertError::Network

    let status = response.status();
    if !status.is_success() {
        tracing::error!("Converter returned HTTP {} for '{}'", status, file_name);
        return Err(ConvertError::Http(status));
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"));

    let body = response.text().await?;
    tracing::debug!("Converter answered with {} bytes (json: {})", body.len(), is_json);

    if is_json {
        Document::from_json(&body)
    } else {
        Ok(Document::new(html::blocks_from_html(&body)))
    }
}

/// Loads a document from disk, converting it according to its extension.
///
/// `.json` is read as a block list, `.html`/`.htm` goes through the built-in
/// HTML converter, anything else (e.g. `.docx`) needs an external converter URL.
pub async fn load_document(path: &Path, converter_url: Option<&str>) -> Result<Document, ConvertError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => {
            let json = tokio::fs::read_to_string(path).await?;
            Document::from_json(&json)
        }
        "html" | "htm" => {
            let markup = tokio::fs::read_to_string(path).await?;
            Ok(Document::new(html::blocks_from_html(&markup)))
        }
        _ => {
            let url = converter_url.ok_or_else(|| ConvertError::NoConverter(path.display().to_string()))?;
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("document");
            convert_remote(url, file_name, bytes).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;

    // One directory per test, since tests run in parallel and each removes its own
    fn temp_file(name: &str, contents: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("docform_client_{}_{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_json_block_list() {
        let (dir, path) = temp_file("blocks.json", r#"[{"type": "paragraph", "text": "Merhaba"}]"#);
        let doc = tokio_test::block_on(load_document(&path, None));
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(doc.expect("json loads").blocks(), &[Block::paragraph("Merhaba")]);
    }

    #[test]
    fn test_load_html_uses_builtin_converter() {
        let (dir, path) = temp_file("form.HTML", "<h1>Kapsam</h1><p>Proje kapsamı</p>");
        let doc = tokio_test::block_on(load_document(&path, None));
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(doc.expect("html loads").len(), 2);
    }

    #[test]
    fn test_binary_document_without_converter_is_an_error() {
        let (dir, path) = temp_file("form.docx", "PK");
        let err = tokio_test::block_on(load_document(&path, None)).unwrap_err();
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(err, ConvertError::NoConverter(_)), "got {:?}", err);
    }
}
