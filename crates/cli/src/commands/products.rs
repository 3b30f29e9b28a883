//! Product commands.
//!
//! `create` and `update` go through [`ProductForm`], the same state the
//! dashboard editor uses: `update` seeds the form from the stored product,
//! applies the flags and submits a full replace. `patch` sends only the
//! flags that were given.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde_json::json;

use catalog_client::{CategoryChips, DownscaleOptions, ProductForm, downscale};
use catalog_core::dto::ProductPayload;
use catalog_core::{Price, ProductId};

use super::{Api, CommandError, print_json};

#[derive(Subcommand)]
pub enum ProductCommand {
    /// List your products, newest first
    List {
        /// Only products in exactly this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Get { id: ProductId },
    /// Create a product
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        price: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Replace a product, keeping any field not given
    Update {
        id: ProductId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change only the given fields
    Patch {
        id: ProductId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a product
    Delete { id: ProductId },
    /// Show the category chips and the products under one of them
    Categories {
        /// Chip to select (defaults to "All")
        #[arg(short, long)]
        select: Option<String>,
    },
}

#[derive(Args)]
pub struct FieldArgs {
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Remote image URL; clears any embedded image
    #[arg(long, conflicts_with = "image_file")]
    image_url: Option<String>,
    /// Local image to downscale and embed; clears any image URL
    #[arg(long)]
    image_file: Option<PathBuf>,
    /// Longest side of an embedded image, in pixels
    #[arg(long, default_value_t = 800)]
    max_dimension: u32,
    /// JPEG quality of an embedded image
    #[arg(long, default_value_t = 80)]
    quality: u8,
}

impl FieldArgs {
    /// Read and downscale `--image-file`, if given.
    async fn embedded_image(&self) -> Result<Option<String>, CommandError> {
        let Some(path) = &self.image_file else {
            return Ok(None);
        };
        let options = DownscaleOptions {
            max_dimension: self.max_dimension,
            quality: self.quality,
        };
        Ok(Some(load_image(path, options).await?))
    }

    async fn apply_to(&self, form: &mut ProductForm) -> Result<(), CommandError> {
        if let Some(description) = &self.description {
            form.description.clone_from(description);
        }
        if let Some(category) = &self.category {
            form.category.clone_from(category);
        }
        if let Some(url) = &self.image_url {
            form.set_image_url(url.as_str());
        }
        if let Some(data_url) = self.embedded_image().await? {
            form.attach_image(data_url);
        }
        Ok(())
    }
}

pub async fn run(api: &Api, command: ProductCommand) -> Result<(), CommandError> {
    let client = api.signed_in().await?;

    match command {
        ProductCommand::List { category } => {
            let products = match category {
                Some(category) => client.products_in_category(&category).await?,
                None => client.products().await?,
            };
            print_json(&products)
        }
        ProductCommand::Get { id } => print_json(&client.product(id).await?),
        ProductCommand::Create {
            title,
            price,
            fields,
        } => {
            let mut form = ProductForm::new();
            form.title = title;
            form.price = price;
            fields.apply_to(&mut form).await?;
            print_json(&client.save_product(&form).await?)
        }
        ProductCommand::Update {
            id,
            title,
            price,
            fields,
        } => {
            let mut form = ProductForm::edit(&client.product(id).await?);
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(price) = price {
                form.price = price;
            }
            fields.apply_to(&mut form).await?;
            print_json(&client.save_product(&form).await?)
        }
        ProductCommand::Patch {
            id,
            title,
            price,
            fields,
        } => {
            let payload = ProductPayload {
                title,
                price: price.as_deref().map(Price::parse).transpose()?,
                description: fields.description.clone(),
                category: fields.category.clone(),
                image_url: fields.image_url.clone(),
                image_base64: fields.embedded_image().await?,
            };
            print_json(&client.patch_product(id, &payload).await?)
        }
        ProductCommand::Delete { id } => {
            client.delete_product(id).await?;
            print_json(&json!({ "success": true }))
        }
        ProductCommand::Categories { select } => {
            let products = client.products().await?;
            let mut chips = CategoryChips::from_products(&products);
            if let Some(chip) = select
                && !chips.select(&chip)
            {
                tracing::warn!(%chip, "No such category, showing all products");
            }
            print_json(&json!({
                "chips": chips.chips(),
                "selected": chips.selected(),
                "products": chips.filter(&products),
            }))
        }
    }
}

async fn load_image(path: &Path, options: DownscaleOptions) -> Result<String, CommandError> {
    let bytes = tokio::fs::read(path).await?;
    // Decoding and resizing is CPU-bound
    let data_url = tokio::task::spawn_blocking(move || downscale(&bytes, options))
        .await
        .map_err(std::io::Error::other)??;
    Ok(data_url)
}
