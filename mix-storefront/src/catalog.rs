//! Catalog browsing and management
//!
//! Product creation is a two-phase write: images go to object storage
//! first, then the row is inserted with their public URLs. A failed
//! row insert removes the freshly uploaded objects. Deletion runs the
//! other way around and treats storage failures as non-fatal, since an
//! orphaned image is cheaper than a ghost product.

use crate::notify::Notifier;
use mix_client::{Backend, Query};
use shared::models::{NewProduct, Product, ProductUpdate};
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;
use validator::Validate;

const IMAGE_BUCKET: &str = "produtos";

/// An image file staged for upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct CatalogService {
    backend: Arc<dyn Backend>,
    notifier: Notifier,
}

impl CatalogService {
    pub fn new(backend: Arc<dyn Backend>, notifier: Notifier) -> Self {
        Self { backend, notifier }
    }

    /// Catalog as sellers browse it, alphabetical
    pub async fn list_for_seller(&self) -> AppResult<Vec<Product>> {
        let rows = self
            .backend
            .select("produtos", Query::new().order_asc("name"))
            .await
            .map_err(AppError::from)?;
        parse_products(rows)
    }

    /// Catalog as admins manage it, newest first
    pub async fn list_for_admin(&self) -> AppResult<Vec<Product>> {
        let rows = self
            .backend
            .select("produtos", Query::new().order_desc("created_at"))
            .await
            .map_err(AppError::from)?;
        parse_products(rows)
    }

    /// Case-insensitive name search
    pub async fn search(&self, term: &str) -> AppResult<Vec<Product>> {
        let rows = self
            .backend
            .select(
                "produtos",
                Query::new()
                    .ilike("name", format!("%{}%", term))
                    .order_asc("name"),
            )
            .await
            .map_err(AppError::from)?;
        parse_products(rows)
    }

    /// Create a product with its images
    pub async fn create_product(
        &self,
        mut product: NewProduct,
        images: Vec<ImageUpload>,
    ) -> AppResult<Product> {
        product
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        if images.is_empty() {
            return Err(AppError::new(ErrorCode::ImageRequired));
        }

        // Phase one: uploads
        let mut paths = Vec::with_capacity(images.len());
        for image in images {
            let path = format!("{}_{}", uuid::Uuid::new_v4(), image.file_name);
            let content_type = mime_guess::from_path(&image.file_name)
                .first_or_octet_stream()
                .to_string();
            if let Err(err) = self
                .backend
                .upload(IMAGE_BUCKET, &path, image.bytes, &content_type)
                .await
            {
                self.remove_images_best_effort(&paths).await;
                return Err(AppError::storage(err.to_string()));
            }
            paths.push(path);
        }
        product.image_urls = paths
            .iter()
            .map(|p| self.backend.public_url(IMAGE_BUCKET, p))
            .collect();

        // Phase two: the row
        let inserted = match self
            .backend
            .insert("produtos", serde_json::to_value(&product)?)
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(error = %err, "product insert failed, removing uploaded images");
                self.remove_images_best_effort(&paths).await;
                return Err(AppError::from(err));
            }
        };
        let created: Product = inserted
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| AppError::backend("product insert returned no row"))?;
        tracing::info!(product = %created.id, codigo = %created.codigo, "product created");
        Ok(created)
    }

    /// Patch a product's fields (images are managed at creation)
    pub async fn update_product(&self, product_id: &str, patch: ProductUpdate) -> AppResult<Product> {
        let updated = self
            .backend
            .update(
                "produtos",
                Query::new().eq("id", product_id),
                serde_json::to_value(&patch)?,
            )
            .await
            .map_err(AppError::from)?;
        updated
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))
    }

    /// Delete a product and its stored images
    ///
    /// Storage cleanup failures are reported but do not block the row
    /// deletion.
    pub async fn delete_product(&self, product: &Product) -> AppResult<()> {
        let paths: Vec<String> = product
            .image_urls
            .iter()
            .filter_map(|url| storage_path_of(url))
            .collect();
        if !paths.is_empty() {
            if let Err(err) = self.backend.remove(IMAGE_BUCKET, &paths).await {
                tracing::warn!(product = %product.id, error = %err, "image cleanup failed");
                self.notifier
                    .warn("Produto excluído, mas as imagens não puderam ser removidas");
            }
        }

        self.backend
            .delete("produtos", Query::new().eq("id", &product.id))
            .await
            .map_err(AppError::from)?;
        tracing::info!(product = %product.id, "product deleted");
        Ok(())
    }

    async fn remove_images_best_effort(&self, paths: &[String]) {
        if paths.is_empty() {
            return;
        }
        if let Err(err) = self.backend.remove(IMAGE_BUCKET, paths).await {
            tracing::warn!(error = %err, "failed to remove uploaded images");
        }
    }
}

fn parse_products(rows: Vec<serde_json::Value>) -> AppResult<Vec<Product>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::from))
        .collect()
}

/// Storage path from a public URL (its last segment)
fn storage_path_of(url: &str) -> Option<String> {
    url.rsplit('/').next().map(String::from).filter(|s| !s.is_empty())
}
