use super::traits::ImageStore;
use crate::errors::StoreError;
use crate::models::{
    DenseImage,
    ImageId,
    StoredImage,
};
use std::fs::File;
use std::path::{
    Path,
    PathBuf,
};
use tracing::debug;
use uuid::Uuid;
use zstd::stream::read::Decoder;
use zstd::stream::write::Encoder;

pub const FS_STORE_KIND: &str = "fs";
const IMAGE_EXTENSION: &str = "img.zst";

/// Image store writing one zstd compressed MessagePack file per raster.
///
/// Layout: `<root>/<dataset_id>/<image_id>.img.zst`. Every post gets a new
/// random id, posting the same raster twice leaves two files behind.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
    compression_level: i32,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compression_level: 3,
        }
    }

    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn image_path(&self, dataset_id: &str, id: &ImageId) -> PathBuf {
        self.root
            .join(dataset_id)
            .join(format!("{}.{}", id.as_str(), IMAGE_EXTENSION))
    }

    pub fn load_image(&self, dataset_id: &str, id: &ImageId) -> Result<StoredImage, StoreError> {
        let path = self.image_path(dataset_id, id);
        let io_err = |source: std::io::Error| StoreError::Io {
            source,
            path: Some(path.clone()),
        };
        let file = File::open(&path).map_err(io_err)?;
        let decoder = Decoder::new(file).map_err(io_err)?;
        rmp_serde::decode::from_read(decoder).map_err(|e| StoreError::ImageStore {
            store_kind: FS_STORE_KIND.to_string(),
            source: format!("decoding {}: {}", path.display(), e),
        })
    }

    fn write_image(&self, path: &Path, image: &DenseImage<'_>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            source,
            path: Some(path.to_path_buf()),
        };
        let file = File::create_new(path).map_err(io_err)?;
        let mut encoder = Encoder::new(file, self.compression_level).map_err(io_err)?;
        rmp_serde::encode::write_named(&mut encoder, image).map_err(|e| {
            StoreError::ImageStore {
                store_kind: FS_STORE_KIND.to_string(),
                source: format!("encoding {}: {}", path.display(), e),
            }
        })?;
        encoder.finish().map_err(io_err)?;
        Ok(())
    }
}

impl ImageStore for FsImageStore {
    fn post_image(
        &mut self,
        store_kind: &str,
        dataset_id: &str,
        image: &DenseImage<'_>,
    ) -> Result<ImageId, StoreError> {
        if store_kind != FS_STORE_KIND {
            return Err(StoreError::ImageStore {
                store_kind: store_kind.to_string(),
                source: format!("filesystem store only serves '{}'", FS_STORE_KIND),
            });
        }

        let dir = self.root.join(dataset_id);
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            source,
            path: Some(dir.clone()),
        })?;

        let id = ImageId::new(Uuid::new_v4().simple().to_string());
        let path = self.image_path(dataset_id, &id);
        self.write_image(&path, image)?;
        debug!("Wrote {}x{} image to {}", image.height, image.width, path.display());
        Ok(id)
    }
}
