use crate::{ConfigLocation, CpuSet, Mode, SetState, parse_with};

impl CpuSet {
    /// Applies one more occurrence of a repeatable configuration setting to this set.
    ///
    /// Repeated values accumulate: the members of `value` are added to the set. An empty value
    /// clears the set back to [`SetState::Unset`]. The value is always parsed in
    /// [`Mode::Lenient`], so problems are also emitted as diagnostics.
    ///
    /// ```
    /// use cpuset::{CpuSet, SetState};
    ///
    /// let mut affinity = CpuSet::new();
    /// affinity.extend_from_str("1,2").unwrap();
    /// affinity.extend_from_str("3").unwrap();
    /// assert_eq!(affinity.to_string(), "1 2 3");
    ///
    /// affinity.extend_from_str("").unwrap();
    /// assert_eq!(affinity.state(), SetState::Unset);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if `value` does not parse or if storage cannot be grown. The set is unchanged on
    /// error.
    pub fn extend_from_str(&mut self, value: &str) -> crate::Result<()> {
        self.extend_from_str_with(value, &ConfigLocation::new())
    }

    /// Same as [`extend_from_str()`][Self::extend_from_str] but attaches `location` to any
    /// diagnostics.
    ///
    /// # Errors
    ///
    /// See [`extend_from_str()`][Self::extend_from_str].
    pub fn extend_from_str_with(
        &mut self,
        value: &str,
        location: &ConfigLocation,
    ) -> crate::Result<()> {
        let parsed = parse_with(value, Mode::Lenient, location)?;

        if parsed.state() == SetState::Unset {
            self.reset();
            return Ok(());
        }

        if self.state() == SetState::Unset {
            *self = parsed;
            return Ok(());
        }

        self.add_all(&parsed)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::{CpuSet, Error, SetState};

    #[test]
    fn empty_value_resets() {
        let mut set = CpuSet::from_indices([1, 2]).unwrap();

        set.extend_from_str("").unwrap();

        assert_eq!(set.state(), SetState::Unset);
        assert_eq!(set.allocated(), 0);
    }

    #[test]
    fn delimiter_only_value_resets() {
        let mut set = CpuSet::from_indices([1, 2]).unwrap();

        set.extend_from_str(" , ").unwrap();

        assert_eq!(set.state(), SetState::Unset);
    }

    #[test]
    fn merges_into_existing() {
        let mut set = CpuSet::from_indices([1, 2]).unwrap();

        set.extend_from_str("3").unwrap();

        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn unset_takes_parsed_value() {
        let mut set = CpuSet::new();

        set.extend_from_str("4-5").unwrap();

        assert_eq!(set.to_string(), "4 5");
    }

    #[test]
    fn inverted_range_does_not_reset() {
        let mut set = CpuSet::from_indices([1]).unwrap();

        set.extend_from_str("5-2").unwrap();

        assert_eq!(set.to_string(), "1");
        assert_eq!(set.state(), SetState::Populated);
    }

    #[test]
    fn inverted_range_on_unset_is_explicitly_empty() {
        let mut set = CpuSet::new();

        set.extend_from_str("5-2").unwrap();

        assert_eq!(set.state(), SetState::ExplicitlyEmpty);
    }

    #[test]
    fn failure_leaves_set_unchanged() {
        let mut set = CpuSet::from_indices([1, 2]).unwrap();
        let before = set.clone();
        let allocated = set.allocated();

        let error = set.extend_from_str("3,9000").unwrap_err();
        assert!(matches!(error, Error::IndexOutOfRange { index: 9000 }));

        set.extend_from_str("bogus").unwrap_err();

        assert_eq!(set, before);
        assert_eq!(set.allocated(), allocated);
    }

    #[test]
    fn sequence_of_directives() {
        let mut set = CpuSet::new();

        for value in ["0", "2-3", "", "7", "6,7"] {
            set.extend_from_str(value).unwrap();
        }

        assert_eq!(set.to_string(), "6 7");
    }
}
