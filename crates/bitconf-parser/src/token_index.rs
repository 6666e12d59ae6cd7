//! Block id → contributing tokens.

use std::collections::HashMap;

use crate::structure::BlockId;

/// Maps each [`BlockId`] to the positions (in the flattened token stream)
/// of the tokens that built the block, in stream order.
#[derive(Debug, Default, Clone)]
pub(crate) struct TokenIndex {
    map: HashMap<BlockId, Vec<usize>>,
}

impl TokenIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record token `token_idx` as part of block `id`.
    pub(crate) fn insert(&mut self, id: BlockId, token_idx: usize) {
        self.map.entry(id).or_default().push(token_idx);
    }

    /// Token positions recorded for `id`, if any.
    pub(crate) fn get(&self, id: BlockId) -> Option<&[usize]> {
        self.map.get(&id).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order() {
        let mut index = TokenIndex::new();
        index.insert(BlockId(0), 3);
        index.insert(BlockId(1), 7);
        index.insert(BlockId(0), 5);

        assert_eq!(index.get(BlockId(0)), Some(&[3, 5][..]));
        assert_eq!(index.get(BlockId(1)), Some(&[7][..]));
        assert_eq!(index.get(BlockId(2)), None);
    }
}
