// src/services/media.rs

use image::{codecs::jpeg::JpegEncoder, ColorType, DynamicImage, GenericImageView};

use crate::common::error::AppError;
use crate::models::news::MediaKind;

pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", // imagens
    "mp4", "avi", "mov", "wmv", "flv", "webm", // vídeos
    "pdf", "doc", "docx", "txt", // documentos
];

// Formatos que o compressor sabe reescrever (GIF fica como está, pode ser animado)
const COMPRESSIBLE: &[&str] = &["image/jpeg", "image/png", "image/webp"];

const MAX_WIDTH: u32 = 1920;
const MAX_HEIGHT: u32 = 1080;
const JPEG_QUALITY: u8 = 85;
const MAX_NAME_LEN: usize = 100;

// =============================================================================
//  1. VALIDAÇÃO DO ENVIO
// =============================================================================

/// Um envio aceite: nome limpo, extensão, tipo MIME efetivo e classificação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub file_name: String,
    pub extension: String,
    pub content_type: String,
    pub kind: MediaKind,
}

impl ValidatedUpload {
    pub fn is_compressible(&self) -> bool {
        self.kind == MediaKind::Image && COMPRESSIBLE.contains(&self.content_type.as_str())
    }
}

pub fn validate_upload(
    file_name: &str,
    declared_type: Option<&str>,
    size: usize,
) -> Result<ValidatedUpload, AppError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::InvalidInput("file_too_large"));
    }

    let clean = clean_filename(file_name);
    let extension = extension_of(&clean).ok_or(AppError::InvalidInput("file_type_not_allowed"))?;
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::InvalidInput("file_type_not_allowed"));
    }

    let content_type = resolve_content_type(&clean, declared_type);
    let kind = classify_media(&content_type);

    Ok(ValidatedUpload { file_name: clean, extension, content_type, kind })
}

/// O tipo declarado pelo cliente; se faltar (ou for genérico), adivinha pela extensão.
pub fn resolve_content_type(file_name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_ascii_lowercase(),
        _ => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

pub fn classify_media(content_type: &str) -> MediaKind {
    if content_type.starts_with("image/") {
        MediaKind::Image
    } else if content_type.starts_with("video/") {
        MediaKind::Video
    } else {
        MediaKind::Document
    }
}

/// Nome seguro para disco: ASCII, sem separadores de caminho, espaços viram '_'.
pub fn clean_filename(name: &str) -> String {
    // Alguns browsers mandam o caminho completo
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let clean: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() => Some(c),
            '-' | '_' | '.' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let (stem, ext) = match clean.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, Some(ext.to_ascii_lowercase())),
        Some((stem, _)) => (stem, None),
        None => (clean.as_str(), None),
    };
    let stem = stem.trim_matches('.');
    let stem: String = if stem.is_empty() {
        "file".to_string()
    } else {
        stem.chars().take(MAX_NAME_LEN).collect()
    };

    match ext {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Troca a extensão (o ficheiro comprimido é sempre JPEG).
pub fn with_extension(file_name: &str, extension: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) => format!("{}.{}", stem, extension),
        None => format!("{}.{}", file_name, extension),
    }
}

// =============================================================================
//  2. PROCESSAMENTO (compressão e miniaturas)
// =============================================================================

#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Operações pesadas de mídia. Síncronas: o chamador usa `spawn_blocking`.
pub trait MediaProcessor: Send + Sync {
    /// Redimensiona/recomprime uma imagem.
    fn compress(&self, image: &[u8]) -> anyhow::Result<ProcessedImage>;

    /// Miniatura de um vídeo; `None` quando não é possível extrair.
    fn extract_thumbnail(&self, video: &[u8]) -> anyhow::Result<Option<ProcessedImage>>;
}

/// Implementação com o crate `image`. Não há decoder de vídeo ligado.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageMediaProcessor;

impl ImageMediaProcessor {
    fn flatten_to_rgb(img: &DynamicImage) -> Vec<u8> {
        // Transparência vira fundo branco (JPEG não tem alfa)
        let rgba = img.to_rgba8();
        let mut rgb = Vec::with_capacity((rgba.width() * rgba.height() * 3) as usize);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = a as u32;
            for channel in [r, g, b] {
                let blended = (channel as u32 * alpha + 255 * (255 - alpha)) / 255;
                rgb.push(blended as u8);
            }
        }
        rgb
    }

    fn encode_jpeg(img: &DynamicImage) -> anyhow::Result<ProcessedImage> {
        let (width, height) = img.dimensions();
        let rgb = Self::flatten_to_rgb(img);

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).encode(
            &rgb,
            width,
            height,
            ColorType::Rgb8,
        )?;

        Ok(ProcessedImage {
            bytes,
            width,
            height,
            content_type: "image/jpeg",
            extension: "jpg",
        })
    }
}

impl MediaProcessor for ImageMediaProcessor {
    fn compress(&self, image: &[u8]) -> anyhow::Result<ProcessedImage> {
        let mut img = image::load_from_memory(image)?;

        let (width, height) = img.dimensions();
        if width > MAX_WIDTH || height > MAX_HEIGHT {
            // thumbnail() mantém a proporção dentro da caixa
            img = img.thumbnail(MAX_WIDTH, MAX_HEIGHT);
        }

        Self::encode_jpeg(&img)
    }

    fn extract_thumbnail(&self, _video: &[u8]) -> anyhow::Result<Option<ProcessedImage>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageOutputFormat, Rgba};

    #[test]
    fn upload_over_the_limit_is_rejected() {
        let err = validate_upload("video.mp4", Some("video/mp4"), MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert_eq!(err.code(), "file_too_large");
        assert!(validate_upload("video.mp4", Some("video/mp4"), MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn only_allow_listed_extensions_pass() {
        for name in ["script.exe", "archive.zip", "semextensao", "page.html"] {
            let err = validate_upload(name, None, 10).unwrap_err();
            assert_eq!(err.code(), "file_type_not_allowed", "{}", name);
        }
        assert!(validate_upload("FOTO.JPG", None, 10).is_ok());
    }

    #[test]
    fn kind_comes_from_declared_or_sniffed_mime() {
        let up = validate_upload("clip.mov", None, 10).unwrap();
        assert_eq!(up.kind, MediaKind::Video);

        let up = validate_upload("photo.png", Some("image/png"), 10).unwrap();
        assert_eq!(up.kind, MediaKind::Image);
        assert!(up.is_compressible());

        let up = validate_upload("relatorio.pdf", Some("application/octet-stream"), 10).unwrap();
        assert_eq!(up.content_type, "application/pdf");
        assert_eq!(up.kind, MediaKind::Document);

        let up = validate_upload("anim.gif", None, 10).unwrap();
        assert_eq!(up.kind, MediaKind::Image);
        assert!(!up.is_compressible());
    }

    #[test]
    fn filenames_are_cleaned() {
        assert_eq!(clean_filename("Minha Foto (1).JPG"), "Minha_Foto_1.jpg");
        assert_eq!(clean_filename("../../etc/passwd"), "passwd");
        assert_eq!(clean_filename("C:\\Users\\x\\relatório.pdf"), "relatrio.pdf");
        assert_eq!(clean_filename("é.png"), "file.png");
        assert_eq!(with_extension("foto.png", "jpg"), "foto.jpg");
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([200u8, 10, 10, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn large_images_are_shrunk_into_the_box() {
        let processed = ImageMediaProcessor.compress(&png(3840, 1080)).unwrap();
        assert!(processed.width <= MAX_WIDTH && processed.height <= MAX_HEIGHT);
        assert_eq!(processed.width, 1920);
        assert_eq!(processed.content_type, "image/jpeg");

        let decoded = image::load_from_memory(&processed.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (processed.width, processed.height));
    }

    #[test]
    fn small_images_keep_their_size() {
        let processed = ImageMediaProcessor.compress(&png(64, 32)).unwrap();
        assert_eq!((processed.width, processed.height), (64, 32));
    }

    #[test]
    fn garbage_is_not_an_image() {
        assert!(ImageMediaProcessor.compress(b"not an image").is_err());
        assert!(ImageMediaProcessor.extract_thumbnail(b"video").unwrap().is_none());
    }
}
