/// Ascending, duplicate-free indices of the active recognizer columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationSet {
    indices: Vec<usize>,
}

impl ActivationSet {
    /// Collects the positions of all non-zero flags.
    pub fn from_flags(flags: &[u8]) -> ActivationSet {
        let indices = flags
            .iter()
            .enumerate()
            .filter(|(_, &flag)| flag != 0)
            .map(|(i, _)| i)
            .collect();
        ActivationSet { indices }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_nonzero_positions_in_order() {
        let set = ActivationSet::from_flags(&[0, 1, 0, 0, 3, 1]);
        assert_eq!(set.as_slice(), &[1, 4, 5]);
        assert!(ActivationSet::from_flags(&[0, 0]).is_empty());
    }
}
