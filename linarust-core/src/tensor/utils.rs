/// Calculates the strides for a given shape.
/// Strides represent the number of elements to skip in the flattened data array
/// to move one step along each dimension.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Converts a linear row-major index into coordinates for `shape`.
///
/// Any dimension of size zero makes the shape empty; the result is then all
/// zeros since no valid index exists.
pub fn index_to_coord(index: usize, shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0; shape.len()];
    if shape.iter().any(|&d| d == 0) {
        return coord;
    }
    let mut remaining = index;
    for (c, &dim) in coord.iter_mut().zip(shape).rev() {
        *c = remaining % dim;
        remaining /= dim;
    }
    coord
}

/// Splits a shape into its leading batch dimensions and trailing `core_rank`
/// dimensions. Returns `None` if the shape has fewer than `core_rank` axes.
pub fn split_batch_shape(shape: &[usize], core_rank: usize) -> Option<(&[usize], &[usize])> {
    if shape.len() < core_rank {
        return None;
    }
    Some(shape.split_at(shape.len() - core_rank))
}

/// Resolves a possibly negative axis against `rank`.
pub fn normalize_axis(axis: isize, rank: usize) -> Option<usize> {
    let resolved = if axis < 0 { axis + rank as isize } else { axis };
    if resolved < 0 || resolved as usize >= rank {
        None
    } else {
        Some(resolved as usize)
    }
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
