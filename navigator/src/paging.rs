use crate::error::NavigatorError;
use crate::error::Result;
use std::slice::Chunks;

/// Lazily splits `list` into consecutive pages of at most `size` items.
pub fn chunk<T>(list: &[T], size: usize) -> Result<Chunks<'_, T>> {
    if size == 0 {
        return Err(NavigatorError::InvalidPageSize);
    }
    Ok(list.chunks(size))
}

pub fn page<T>(list: &[T], size: usize) -> Result<Vec<&[T]>> {
    Ok(chunk(list, size)?.collect())
}

pub fn page_count(len: usize, size: usize) -> Result<usize> {
    if size == 0 {
        return Err(NavigatorError::InvalidPageSize);
    }
    Ok(len.div_ceil(size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pages_evenly_and_keeps_the_remainder() {
        let letters = ["a", "b", "c", "d", "e"];
        let pages = page(&letters, 2).unwrap();
        assert_eq!(pages, vec![&["a", "b"][..], &["c", "d"][..], &["e"][..]]);
        assert_eq!(page(&letters, 5).unwrap(), vec![&letters[..]]);
        assert_eq!(page(&letters, 9).unwrap(), vec![&letters[..]]);
        assert_eq!(page_count(letters.len(), 2).unwrap(), 3);
    }

    #[test]
    fn empty_lists_have_no_pages() {
        let empty: [u8; 0] = [];
        assert!(page(&empty, 3).unwrap().is_empty());
        assert_eq!(page_count(0, 3).unwrap(), 0);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(matches!(page(&[1, 2], 0), Err(NavigatorError::InvalidPageSize)));
        assert!(matches!(chunk(&[1, 2], 0), Err(NavigatorError::InvalidPageSize)));
        assert!(matches!(page_count(4, 0), Err(NavigatorError::InvalidPageSize)));
    }

    #[test]
    fn chunking_restarts_per_call() {
        let numbers = [1, 2, 3];
        let first: Vec<_> = chunk(&numbers, 2).unwrap().collect();
        let second: Vec<_> = chunk(&numbers, 2).unwrap().collect();
        assert_eq!(first, second);
    }
}
