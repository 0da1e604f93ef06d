use std::io;
use std::path::Path;

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Loads a tokenizer from a model directory or an explicit `tokenizer.json` path.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new("tokenizer.json"))
    {
        model_path.to_path_buf()
    } else if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Model path has no parent"))?
            .join("tokenizer.json")
    };

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}

/// Loads a tokenizer configured for batched inference.
///
/// Inputs longer than `max_len` tokens are truncated, and every batch is padded
/// to its longest member so encodings can be stacked into one tensor.
pub fn load_batch_tokenizer(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer = load_tokenizer(model_path)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));

    Ok(tokenizer)
}

/// Scales `vector` to unit L2 length in place. Zero vectors are left untouched.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Stacks equally-padded token rows into one flat buffer plus its `(rows, cols)` shape.
pub(crate) fn stack_rows<'a>(rows: impl Iterator<Item = &'a [u32]>) -> (Vec<u32>, usize, usize) {
    let mut flat = Vec::new();
    let mut count = 0;
    let mut width = 0;
    for row in rows {
        width = row.len();
        flat.extend_from_slice(row);
        count += 1;
    }
    (flat, count, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_l2_unit_length() {
        let mut v = vec![3.0, 4.0];
        normalize_l2(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_l2_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        normalize_l2(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_stack_rows_shape() {
        let a = [1u32, 2, 3];
        let b = [4u32, 5, 0];
        let (flat, rows, cols) = stack_rows([&a[..], &b[..]].into_iter());
        assert_eq!(flat, vec![1, 2, 3, 4, 5, 0]);
        assert_eq!((rows, cols), (2, 3));
    }

    #[test]
    fn test_load_tokenizer_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_tokenizer(dir.path()).is_err());
    }
}
