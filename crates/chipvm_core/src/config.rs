use typed_builder::TypedBuilder;

/// Behaviours that differed between historical interpreters.
///
/// Every flag defaults to `false`, the legacy behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, TypedBuilder)]
pub struct Quirks {
    /// 8XY6/8XYE copy VY into VX before shifting.
    #[builder(default)]
    pub shift_copies_vy: bool,
    /// BNNN adds the register named by the high nibble of NNN instead of V0.
    #[builder(default)]
    pub jump_offset_uses_vx: bool,
    /// FX55/FX65 leave I pointing past the last register transferred.
    #[builder(default)]
    pub load_store_increments_index: bool,
}

impl Quirks {
    pub const fn legacy() -> Self {
        Self {
            shift_copies_vy: false,
            jump_offset_uses_vx: false,
            load_store_increments_index: false,
        }
    }

    pub const fn modern() -> Self {
        Self {
            shift_copies_vy: true,
            jump_offset_uses_vx: true,
            load_store_increments_index: true,
        }
    }
}

/// Construction-time settings for an [`Emulator`](crate::Emulator).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, TypedBuilder)]
pub struct Config {
    #[builder(default)]
    pub quirks: Quirks,
    /// Maximum call depth. `None` lets the stack grow without bound.
    #[builder(default, setter(strip_option))]
    pub stack_limit: Option<usize>,
    /// Seed for CXNN. `None` seeds from the OS.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_legacy() {
        assert_eq!(Quirks::default(), Quirks::legacy());
        let config = Config::builder().build();
        assert_eq!(config.quirks, Quirks::legacy());
        assert_eq!(config.stack_limit, None);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn builder_sets_individual_quirks() {
        let quirks = Quirks::builder().jump_offset_uses_vx(true).build();
        assert!(quirks.jump_offset_uses_vx);
        assert!(!quirks.shift_copies_vy);
        assert!(!quirks.load_store_increments_index);

        let config = Config::builder()
            .quirks(Quirks::modern())
            .stack_limit(16)
            .seed(7)
            .build();
        assert_eq!(config.stack_limit, Some(16));
        assert_eq!(config.seed, Some(7));
        assert!(config.quirks.shift_copies_vy);
    }
}
