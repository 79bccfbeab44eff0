use std::{
	io,
	path::{Path, PathBuf},
};

use image::ImageFormat;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::extract::Upload;

/// Directory under the media root that post images are stored in.
pub const POST_IMAGE_DIR: &str = "posts";

/// Image formats accepted for post images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcceptedFormat {
	Gif,
	Png,
	Jpeg,
	Webp,
	Bmp,
}

impl AcceptedFormat {
	fn from_content_type(content_type: &str) -> Option<Self> {
		match content_type {
			"image/gif" => Some(Self::Gif),
			"image/png" => Some(Self::Png),
			"image/jpeg" => Some(Self::Jpeg),
			"image/webp" => Some(Self::Webp),
			"image/bmp" => Some(Self::Bmp),
			_ => None,
		}
	}

	/// Detects the format from the leading bytes of the file.
	fn from_bytes(bytes: &[u8]) -> Option<Self> {
		match image::guess_format(bytes).ok()? {
			ImageFormat::Gif => Some(Self::Gif),
			ImageFormat::Png => Some(Self::Png),
			ImageFormat::Jpeg => Some(Self::Jpeg),
			ImageFormat::WebP => Some(Self::Webp),
			ImageFormat::Bmp => Some(Self::Bmp),
			_ => None,
		}
	}
}

/// Whether the upload is an accepted image whose content matches the
/// content type it was sent with.
pub fn is_image(upload: &Upload) -> bool {
	let Some(claimed) = upload
		.content_type
		.as_deref()
		.and_then(AcceptedFormat::from_content_type)
	else {
		return false;
	};

	AcceptedFormat::from_bytes(&upload.bytes) == Some(claimed)
}

/// Strips directories and unusual characters from a client-provided file name.
fn clean_file_name(name: &str) -> String {
	let name = name.rsplit(['/', '\\']).next().unwrap_or_default();
	let name = name
		.chars()
		.filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
		.collect::<String>();
	let name = name.trim_start_matches('.');

	if name.is_empty() {
		"image".into()
	} else {
		name.into()
	}
}

fn with_suffix(name: &str) -> String {
	let suffix = &Uuid::new_v4().simple().to_string()[..7];

	match name.rsplit_once('.') {
		Some((stem, extension)) => format!("{stem}_{suffix}.{extension}"),
		None => format!("{name}_{suffix}"),
	}
}

/// Writes an uploaded image below `media_root`, returning its path relative
/// to the media root. An existing file is never overwritten; the name gets
/// a random suffix instead.
pub async fn store_image(media_root: &Path, upload: &Upload) -> io::Result<String> {
	let directory = media_root.join(POST_IMAGE_DIR);

	tokio::fs::create_dir_all(&directory).await?;

	let mut name = clean_file_name(&upload.file_name);

	loop {
		let path: PathBuf = directory.join(&name);
		let file = tokio::fs::OpenOptions::new()
			.write(true)
			.create_new(true)
			.open(&path)
			.await;

		match file {
			Ok(mut file) => {
				file.write_all(&upload.bytes).await?;
				file.flush().await?;

				tracing::debug!(path = %path.display(), "stored uploaded image");

				return Ok(format!("{POST_IMAGE_DIR}/{name}"));
			}
			Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
				name = with_suffix(&clean_file_name(&upload.file_name));
			}
			Err(error) => return Err(error),
		}
	}
}

/// Deletes an image written by [`store_image`], for when the post that
/// should reference it could not be saved.
pub async fn remove_image(media_root: &Path, image: &str) {
	if let Err(error) = tokio::fs::remove_file(media_root.join(image)).await {
		tracing::warn!(%error, image, "failed to remove orphaned image");
	}
}
