use std::collections::HashSet;

use log::{debug, info, warn};
use pb_schema::{fold_label, same_label, BossTime};

use crate::{
    layout::IDENTITY_COLUMNS, Stage, PlayerIdentity, SheetLayout, SheetRange, StoreError, SyncError,
    TableStore,
};

/// A single cell write that failed. The rest of the account went on.
#[derive(Debug)]
pub struct CellFailure {
    pub column: String,
    pub error: StoreError,
}

#[derive(Debug)]
pub struct Reconciliation {
    /// 1-based sheet row of the player.
    pub row: u32,
    pub created: bool,
    pub headers_added: usize,
    /// Boss cells written in this call.
    pub improved: u32,
    pub failures: Vec<CellFailure>,
}

/// Merges personal bests into the sheet, one player at a time.
///
/// A cell is only ever overwritten with a strictly lower time, or filled
/// when it holds no number. Running the same batch twice writes nothing the
/// second time.
pub struct Reconciler<S> {
    store: S,
    layout: SheetLayout,
    last_col: usize,
}

impl<S: TableStore> Reconciler<S> {
    pub fn new(store: S, layout: SheetLayout) -> Result<Self, crate::LayoutError> {
        let last_col = layout.last_col()?;
        Ok(Self {
            store,
            layout,
            last_col,
        })
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn reconcile(
        &mut self,
        identity: &PlayerIdentity,
        observations: &[BossTime],
    ) -> Result<Reconciliation, SyncError> {
        let mut values = self
            .store
            .read_all(&self.window())
            .map_err(SyncError::store(Stage::LoadTable))?;
        let mut headers = values.first().cloned().unwrap_or_default();

        let headers_added = self.ensure_columns(&mut headers, observations)?;

        let mut created = false;
        let row_idx = match self.find_row(&values, identity) {
            Some(i) => i,
            None => {
                self.append_player(identity, headers.len())?;
                created = true;
                values = self
                    .store
                    .read_all(&self.window())
                    .map_err(SyncError::store(Stage::ReloadTable))?;
                self.find_row(&values, identity)
                    .ok_or_else(|| SyncError::RowNotFound {
                        identity: identity.to_string(),
                    })?
            }
        };
        // values[0] is sheet row 1
        let row_no = row_idx as u32 + 1;
        let mut row = values.swap_remove(row_idx);
        if row.len() < headers.len() {
            row.resize(headers.len(), String::new());
        }

        if created {
            info!("created row {row_no} for {identity}");
        }

        let mut failures = Vec::new();
        self.refresh_identity(identity, row_no, &mut row, &headers, &mut failures);

        let mut improved = 0;
        for obs in observations {
            let Some(col) = boss_column(&headers, &obs.boss) else {
                warn!("no column for {:?} after ensuring headers; skipped", obs.boss);
                continue;
            };

            let existing = row.get(col).and_then(|v| parse_cell(v));
            if existing.is_some_and(|old| i128::from(old) <= i128::from(obs.fastest)) {
                debug!("{identity}: {} keeps {:?} (got {})", obs.boss, existing, obs.fastest);
                continue;
            }

            let value = obs.fastest.to_string();
            match self.write_cell(col, row_no, &value) {
                Ok(()) => {
                    debug!("{identity}: {} {:?} -> {}", obs.boss, existing, obs.fastest);
                    row[col] = value;
                    improved += 1;
                }
                Err(error) => {
                    warn!("{identity}: writing {} failed: {error}", obs.boss);
                    failures.push(CellFailure {
                        column: headers[col].clone(),
                        error,
                    });
                }
            }
        }

        info!("{identity}: improved {improved} boss time(s)");
        Ok(Reconciliation {
            row: row_no,
            created,
            headers_added,
            improved,
            failures,
        })
    }

    fn window(&self) -> SheetRange {
        SheetRange::window(&self.layout.sheet, self.last_col)
    }

    /// Seeds identity labels on an empty sheet and appends a column for
    /// every boss not already present, ignoring case. Returns how many boss
    /// columns were added.
    fn ensure_columns(
        &mut self,
        headers: &mut Vec<String>,
        observations: &[BossTime],
    ) -> Result<usize, SyncError> {
        let mut dirty = false;
        if headers.len() < IDENTITY_COLUMNS {
            let seeded = self.layout.identity_labels[headers.len()..].to_vec();
            headers.extend(seeded);
            dirty = true;
        }

        let mut known: HashSet<String> = headers[IDENTITY_COLUMNS..]
            .iter()
            .filter(|h| !h.is_empty())
            .map(|h| fold_label(h))
            .collect();
        let mut added = 0;
        for obs in observations {
            if known.insert(fold_label(&obs.boss)) {
                headers.push(obs.boss.clone());
                added += 1;
            }
        }

        if !dirty && added == 0 {
            return Ok(0);
        }

        let limit = self.last_col + 1;
        if headers.len() > limit {
            return Err(SyncError::ColumnLimit {
                needed: headers.len(),
                limit,
                last_column: self.layout.last_column.clone(),
            });
        }

        let range = SheetRange::row_span(&self.layout.sheet, 1, headers.len() - 1);
        self.store
            .write_row(&range, headers)
            .map_err(SyncError::store(Stage::WriteHeaders))?;
        if added > 0 {
            info!("added {added} boss column(s)");
        }
        Ok(added)
    }

    fn find_row(&self, values: &[Vec<String>], identity: &PlayerIdentity) -> Option<usize> {
        values
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| identity.matches(row, self.layout.identity_match))
            .map(|(i, _)| i)
    }

    fn append_player(&mut self, identity: &PlayerIdentity, width: usize) -> Result<(), SyncError> {
        let mut new_row = vec![String::new(); width.max(IDENTITY_COLUMNS)];
        for (cell, field) in new_row.iter_mut().zip(identity.fields()) {
            *cell = field.to_string();
        }
        let range = SheetRange::columns(&self.layout.sheet, self.last_col);
        self.store
            .append_row(&range, &new_row)
            .map_err(SyncError::store(Stage::AppendRow))
    }

    fn refresh_identity(
        &mut self,
        identity: &PlayerIdentity,
        row_no: u32,
        row: &mut [String],
        headers: &[String],
        failures: &mut Vec<CellFailure>,
    ) {
        for (col, field) in identity.fields().into_iter().enumerate() {
            if row[col] == field {
                continue;
            }
            match self.write_cell(col, row_no, field) {
                Ok(()) => {
                    debug!("row {row_no}: {} {:?} -> {field:?}", headers[col], row[col]);
                    row[col] = field.to_string();
                }
                Err(error) => {
                    warn!("row {row_no}: refreshing {} failed: {error}", headers[col]);
                    failures.push(CellFailure {
                        column: headers[col].clone(),
                        error,
                    });
                }
            }
        }
    }

    fn write_cell(&mut self, col: usize, row_no: u32, value: &str) -> Result<(), StoreError> {
        let range = SheetRange::cell(&self.layout.sheet, col, row_no);
        self.store.write_row(&range, &[value.to_string()])
    }
}

fn boss_column(headers: &[String], boss: &str) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .skip(IDENTITY_COLUMNS)
        .find(|(_, h)| same_label(h, boss))
        .map(|(i, _)| i)
}

/// Any integer counts as a recorded time, negative ones included. Blank and
/// non-numeric cells count as empty.
fn parse_cell(cell: &str) -> Option<i64> {
    cell.trim().parse().ok()
}
