//! Numeric parameter accumulation for CSI/DCS sequences, including the
//! ISO-8613-6 colon-separated sub-parameter groups SGR color sequences
//! use (spec §4.A, §6).

/// Clamp applied to any single accumulated parameter value, matching
/// xterm's defense against a sender streaming an absurdly long digit run.
pub const MAX_PARAM_VALUE: i64 = 16383;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    /// Each top-level (semicolon-separated) parameter, itself a list of
    /// colon-separated sub-parameters (`38:2::r:g:b`); `None` marks an
    /// omitted sub-parameter (two colons back to back, or a leading one).
    groups: Vec<Vec<Option<i64>>>,
}

impl Params {
    pub fn new() -> Self {
        Params { groups: vec![vec![None]] }
    }

    /// Append a decimal digit to the current (last) sub-parameter.
    pub fn digit(&mut self, d: u8) {
        let sub = self.groups.last_mut().expect("always at least one group").last_mut().expect("always at least one sub-parameter");
        *sub = Some((sub.unwrap_or(0) * 10 + d as i64).min(MAX_PARAM_VALUE));
    }

    /// `;` starts a new top-level parameter group.
    pub fn semicolon(&mut self) {
        self.groups.push(vec![None]);
    }

    /// `:` starts a new sub-parameter within the current group.
    pub fn colon(&mut self) {
        self.groups.last_mut().expect("always at least one group").push(None);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.len() == 1 && self.groups[0] == [None]
    }

    /// The first sub-parameter's value of group `i`, or `default` if
    /// omitted entirely.
    pub fn get(&self, i: usize, default: i64) -> i64 {
        self.groups.get(i).and_then(|g| g.first().copied().flatten()).unwrap_or(default)
    }

    /// All sub-parameters of group `i` (for colon-separated color forms),
    /// with omitted entries as `0` per ECMA-48's default-parameter rule.
    pub fn subparams(&self, i: usize) -> Vec<i64> {
        self.groups.get(i).map(|g| g.iter().map(|v| v.unwrap_or(0)).collect()).unwrap_or_default()
    }

    /// True if group `i` carried any `:`-separated sub-parameters.
    pub fn has_subparams(&self, i: usize) -> bool {
        self.groups.get(i).map(|g| g.len() > 1).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.groups.iter().map(|g| g.first().copied().flatten().unwrap_or(0))
    }
}
