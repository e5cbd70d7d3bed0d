// src/services/storage.rs

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

/// Ficheiro gravado: caminho relativo (guardado no banco), URL pública e tamanho.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: String,
    pub url: String,
    pub size: u64,
}

/// Armazenamento de ficheiros de mídia.
#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    async fn save(&self, path: &str, data: Bytes, content_type: &str) -> Result<StoredFile>;

    /// Apagar um ficheiro que já não existe não é erro.
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Disco local, servido em `base_url` pelo próprio servidor.
#[derive(Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(root: PathBuf, base_url: impl Into<String>) -> Result<Self> {
        std::fs::create_dir_all(&root).context("Falha ao criar o diretório de mídia")?;
        Ok(Self {
            root,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Só caminhos relativos simples: nada de "..", raiz ou prefixos
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            bail!("Caminho de armazenamento inválido: {}", path);
        }
        Ok(self.root.join(relative))
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, path: &str, data: Bytes, _content_type: &str) -> Result<StoredFile> {
        let full_path = self.resolve(path)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Falha ao criar o diretório do ficheiro")?;
        }

        let mut file = tokio::fs::File::create(&full_path)
            .await
            .context("Falha ao criar o ficheiro")?;
        file.write_all(&data).await.context("Falha ao gravar o ficheiro")?;
        file.sync_all().await.context("Falha ao sincronizar o ficheiro")?;

        Ok(StoredFile {
            path: path.to_string(),
            url: self.url_for(path),
            size: data.len() as u64,
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.resolve(path)?;
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Falha ao apagar o ficheiro"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_then_delete_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(temp_dir.path().to_path_buf(), "/media/").unwrap();

        let data = Bytes::from("conteúdo do anexo");
        let stored = storage
            .save("articles/abc/media/anexo.txt", data.clone(), "text/plain")
            .await
            .unwrap();

        assert_eq!(stored.url, "/media/articles/abc/media/anexo.txt");
        assert_eq!(stored.size, data.len() as u64);

        let on_disk = tokio::fs::read(storage.root().join(&stored.path)).await.unwrap();
        assert_eq!(on_disk, data.to_vec());

        storage.delete(&stored.path).await.unwrap();
        assert!(!storage.root().join(&stored.path).exists());

        // Segunda remoção não falha
        storage.delete(&stored.path).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_paths_escaping_the_root() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(temp_dir.path().to_path_buf(), "/media").unwrap();

        for path in ["../fora.txt", "/etc/passwd", "a/../../b", ""] {
            assert!(storage.save(path, Bytes::from("x"), "text/plain").await.is_err(), "{}", path);
        }
    }
}
