use crate::error::{AppError, FileError};
use crate::models::exam_meta::ExamMeta;
use crate::models::upload::ExamUpload;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载试卷元数据
pub async fn load_exam_meta(toml_file_path: &Path) -> Result<ExamMeta> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))?;

    let meta: ExamMeta = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    Ok(meta)
}

/// 加载单个 .docx 及其同名 TOML 元数据（如果存在）
pub async fn load_upload(docx_path: &Path) -> Result<ExamUpload> {
    let bytes = fs::read(docx_path)
        .await
        .map_err(|e| AppError::file_read_failed(docx_path.display().to_string(), e))?;

    let file_name = docx_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let sidecar = docx_path.with_extension("toml");
    let meta = if fs::try_exists(&sidecar).await.unwrap_or(false) {
        load_exam_meta(&sidecar).await?
    } else {
        ExamMeta::default()
    };

    Ok(ExamUpload::new(file_name, bytes)
        .with_meta(meta)
        .with_file_path(docx_path.to_string_lossy().to_string()))
}

/// 从文件夹中加载所有 .docx 上传文件
///
/// 非 .docx 文件和 Word 的临时锁文件（`~$` 开头）会被跳过。
pub async fn load_all_uploads(folder_path: &str) -> Result<Vec<ExamUpload>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(AppError::File(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        })
        .into());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        if file_name.starts_with("~$") {
            continue;
        }
        if ExamUpload::has_docx_extension(&file_name) {
            paths.push(path);
        } else if path.extension().and_then(|s| s.to_str()) != Some("toml") {
            tracing::warn!("跳过非 .docx 文件: {}", file_name);
        }
    }
    paths.sort();

    let mut uploads = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_upload(&path).await {
            Ok(upload) => {
                tracing::info!("成功加载 {} 字节", upload.bytes.len());
                uploads.push(upload);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(uploads)
}
