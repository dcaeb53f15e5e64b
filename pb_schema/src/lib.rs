use serde::{Deserialize, Serialize};

/// Whole seconds. Personal bests are recorded with fractional precision but
/// exported rounded.
pub type Seconds = u64;

/// Case-folded form of a boss label. Labels that fold the same name the same
/// boss, both here and in sheet headers.
pub fn fold_label(label: &str) -> String {
    label.to_lowercase()
}

pub fn same_label(a: &str, b: &str) -> bool {
    a == b || fold_label(a) == fold_label(b)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BossTime {
    pub boss: String,
    pub fastest: Seconds,
}

impl BossTime {
    pub fn new(boss: impl Into<String>, fastest: Seconds) -> Self {
        Self {
            boss: boss.into(),
            fastest,
        }
    }
}

/// Boss times for one account.
///
/// Labels are unique (a later entry with the same label replaces the earlier
/// one) and entries are ordered by case-insensitive label, so the same input
/// always serializes the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<BossTime>", into = "Vec<BossTime>")]
pub struct BossTimes(Vec<BossTime>);

impl BossTimes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BossTime> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[BossTime] {
        &self.0
    }

    /// Case-insensitive lookup. An exact-case match wins if labels differ
    /// only by case.
    pub fn get(&self, boss: &str) -> Option<Seconds> {
        self.0
            .iter()
            .find(|t| t.boss == boss)
            .or_else(|| self.0.iter().find(|t| same_label(&t.boss, boss)))
            .map(|t| t.fastest)
    }
}

impl FromIterator<BossTime> for BossTimes {
    fn from_iter<I: IntoIterator<Item = BossTime>>(iter: I) -> Self {
        let mut out: Vec<BossTime> = Vec::new();
        for t in iter {
            match out.iter_mut().find(|e| e.boss == t.boss) {
                Some(existing) => existing.fastest = t.fastest,
                None => out.push(t),
            }
        }
        out.sort_by(|a, b| {
            fold_label(&a.boss)
                .cmp(&fold_label(&b.boss))
                .then_with(|| a.boss.cmp(&b.boss))
        });
        Self(out)
    }
}

impl From<Vec<BossTime>> for BossTimes {
    fn from(v: Vec<BossTime>) -> Self {
        v.into_iter().collect()
    }
}

impl From<BossTimes> for Vec<BossTime> {
    fn from(v: BossTimes) -> Self {
        v.0
    }
}

impl<'a> IntoIterator for &'a BossTimes {
    type Item = &'a BossTime;
    type IntoIter = std::slice::Iter<'a, BossTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An account ready for the sheet: it has a display name and at least one
/// boss time. Use [`ExportedAccount::new`] to enforce that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportedAccount {
    pub rsn: String,
    pub boss_data: BossTimes,
}

impl ExportedAccount {
    pub fn new(rsn: impl Into<String>, boss_data: BossTimes) -> Option<Self> {
        let rsn = rsn.into();
        if rsn.is_empty() || boss_data.is_empty() {
            return None;
        }
        Some(Self { rsn, boss_data })
    }
}
