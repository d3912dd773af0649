//! # 背景图加载与拉伸模块
//!
//! ## 设计思路
//!
//! 背景图来自用户上传，属于不可信输入：先做体积与签名校验，再读 header 尺寸做像素上限检查，
//! 最后才完整解码。校验失败属于调用方输入错误，直接向上传播，不重试。
//!
//! ## 实现思路
//!
//! 1. 按来源（文件 / Base64 / 字节 / 已解码图像）取得原始字节
//! 2. `infer` 识别文件签名，拒绝非图片内容
//! 3. 读取 header 尺寸，按像素与内存上限快速拒绝
//! 4. 完整解码并转为 RGBA
//! 5. 拉伸（不裁剪）到画布尺寸：优先 `fast_image_resize`，失败回退 `image::resize_exact`

use base64::{engine::general_purpose, Engine as _};
use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

use super::source::{BackgroundSource, RawImageData};
use super::{CompositorLimits, ComposeError, Compositor};

impl Compositor {
    /// 加载并解码背景图。
    pub(super) fn load_background(
        &self,
        source: &BackgroundSource,
        limits: &CompositorLimits,
    ) -> Result<DynamicImage, ComposeError> {
        let raw = match source {
            BackgroundSource::Image(image) => {
                let (width, height) = image.dimensions();
                Self::validate_pixel_limits(limits, width, height)?;
                return Ok(image.clone());
            }
            BackgroundSource::FilePath(path) => Self::load_from_file(path, limits)?,
            BackgroundSource::Base64(data) => Self::load_from_base64(data, limits)?,
            BackgroundSource::Bytes(bytes) => Self::load_from_bytes(bytes.clone(), limits)?,
        };

        Self::decode_background(raw, limits)
    }

    fn load_from_file(path: &str, limits: &CompositorLimits) -> Result<RawImageData, ComposeError> {
        log::info!("📁 开始读取背景图 - 路径: {}", path);

        let file_path = Path::new(path);
        if !file_path.exists() {
            return Err(ComposeError::FileSystem(format!("文件不存在：{}", path)));
        }

        let metadata = std::fs::metadata(file_path)
            .map_err(|e| ComposeError::FileSystem(format!("无法读取文件信息：{}", e)))?;
        Self::validate_file_size(metadata.len(), limits)?;

        let bytes = std::fs::read(file_path)
            .map_err(|e| ComposeError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "file",
        })
    }

    fn load_from_base64(data: &str, limits: &CompositorLimits) -> Result<RawImageData, ComposeError> {
        log::info!("📝 开始处理 base64 背景图");

        let bytes = Self::parse_base64_with_limit(data, limits.max_file_size)?;
        Self::validate_file_size(bytes.len() as u64, limits)?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "base64",
        })
    }

    fn load_from_bytes(bytes: Vec<u8>, limits: &CompositorLimits) -> Result<RawImageData, ComposeError> {
        Self::validate_file_size(bytes.len() as u64, limits)?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "upload",
        })
    }

    fn validate_file_size(len: u64, limits: &CompositorLimits) -> Result<(), ComposeError> {
        if len > limits.max_file_size {
            return Err(ComposeError::ResourceLimit(format!(
                "背景图过大：{:.2} MB（限制：{:.2} MB）",
                len as f64 / 1024.0 / 1024.0,
                limits.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }

    /// 解析 Base64（支持 `data:image/...;base64,` 前缀），解码前先按长度估算体积。
    pub(crate) fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, ComposeError> {
        let normalized = data.trim();

        let payload = if normalized.starts_with("data:image/") {
            let base64_start = normalized
                .find(";base64,")
                .ok_or_else(|| ComposeError::InvalidFormat("缺少 base64 标记".to_string()))?;
            &normalized[base64_start + 8..]
        } else {
            normalized
        };

        let estimated_len = (payload.len() as u64).div_ceil(4).saturating_mul(3);
        if estimated_len > max_file_size {
            return Err(ComposeError::ResourceLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ComposeError::Decode(format!("Base64 解码失败：{}", e)))
    }

    fn validate_image_signature(bytes: &[u8]) -> Result<(), ComposeError> {
        if bytes.is_empty() {
            return Err(ComposeError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| ComposeError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ComposeError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }

    fn decode_background(raw: RawImageData, limits: &CompositorLimits) -> Result<DynamicImage, ComposeError> {
        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(limits, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| ComposeError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(limits, width, height)?;

        log::info!(
            "✅ 背景图解码成功 - 来源: {} 尺寸: {}x{}",
            raw.source_hint,
            width,
            height
        );

        Ok(decoded)
    }

    /// 仅通过内存中的图片头信息读取宽高。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ComposeError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ComposeError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ComposeError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
    }

    fn validate_pixel_limits(limits: &CompositorLimits, width: u32, height: u32) -> Result<(), ComposeError> {
        let pixels = (width as u64) * (height as u64);
        if pixels > limits.max_decoded_pixels {
            return Err(ComposeError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, limits.max_decoded_pixels
            )));
        }

        let estimated = pixels * 4;
        if estimated > limits.max_decoded_bytes {
            return Err(ComposeError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                limits.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 拉伸（不裁剪）到精确的画布尺寸。
    pub(super) fn stretch_to_canvas(
        image: &DynamicImage,
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> RgbaImage {
        let (src_width, src_height) = image.dimensions();
        if (src_width, src_height) == (width, height) {
            return image.to_rgba8();
        }

        log::debug!(
            "🧩 背景图拉伸：{}x{} -> {}x{}（filter={:?}）",
            src_width,
            src_height,
            width,
            height,
            filter
        );

        match Self::resize_with_fast_image_resize(image, width, height, filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 拉伸失败，回退 image::resize_exact：{}", err);
                image.resize_exact(width, height, filter).to_rgba8()
            }
        }
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<RgbaImage, ComposeError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| ComposeError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(Self::to_fast_alg(filter));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ComposeError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| ComposeError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    fn to_fast_alg(filter: FilterType) -> fr::ResizeAlg {
        match filter {
            FilterType::Nearest => fr::ResizeAlg::Nearest,
            FilterType::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            FilterType::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
            FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }
}
