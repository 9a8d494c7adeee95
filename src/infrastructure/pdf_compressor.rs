//! PDF 压缩 - 基础设施层
//!
//! 把所有嵌入的位图替换为 1x1 灰度占位图，再清理孤立对象并压缩流。
//! 页面结构和文字保持不变，后端分类/抽取只依赖文字。

use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

/// 压缩结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedPdf {
    pub bytes: Vec<u8>,
    /// 被替换的位图数量
    pub images_replaced: usize,
}

/// 去除 PDF 中的位图
///
/// # 返回
/// 重新序列化后的 PDF；无法解析（损坏、加密等）时返回错误，由调用方回退到原文件
pub fn strip_images(bytes: &[u8]) -> Result<StrippedPdf, lopdf::Error> {
    let mut doc = Document::load_mem(bytes)?;

    let image_ids: Vec<_> = doc
        .objects
        .iter()
        .filter(|(_, object)| is_image(object))
        .map(|(id, _)| *id)
        .collect();

    for id in &image_ids {
        doc.objects.insert(*id, Object::Stream(placeholder_image()));
    }

    let pruned = doc.prune_objects();
    doc.compress();

    let mut out = Vec::with_capacity(bytes.len() / 2);
    doc.save_to(&mut out)?;

    debug!(
        "PDF 压缩: 替换 {} 张图片, 清理 {} 个对象, {} → {} 字节",
        image_ids.len(),
        pruned.len(),
        bytes.len(),
        out.len()
    );

    Ok(StrippedPdf {
        bytes: out,
        images_replaced: image_ids.len(),
    })
}

fn is_image(object: &Object) -> bool {
    match object {
        Object::Stream(stream) => stream
            .dict
            .get(b"Subtype")
            .and_then(|subtype| subtype.as_name())
            .map(|name| name == b"Image")
            .unwrap_or(false),
        _ => false,
    }
}

fn placeholder_image() -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0xFF],
    )
}
