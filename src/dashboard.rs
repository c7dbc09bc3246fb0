use std::time::{Duration, Instant};

use serde::Serialize;

use crate::chembl::ChemblClient;
use crate::domain::{ColumnSelection, StandardType, TargetChemblId};
use crate::error::ExplorerError;
use crate::export::{DownloadLink, download_link};
use crate::records::{FieldMap, TargetRecord};
use crate::table::RecordTable;

pub const TITLE: &str = "Chembl Explorer";
pub const QUERY_PROMPT: &str = "Type the name of the disease or target here";
pub const TARGET_PROMPT: &str = "Select a target:";
pub const COLUMN_PROMPT: &str =
    "Select columns (if you do not select any, all of the columns will be included in dataset)";
pub const RETRY_MESSAGE: &str = "Please try another query";
pub const NO_TARGETS_MESSAGE: &str = "No targets found for this query";
pub const NO_ACTIVITY_MESSAGE: &str = "No bioactivity data available for the selected target";

/// Rows of the activity table shown on screen. Exports always carry every row.
pub const PREVIEW_ROWS: usize = 10;

const STEP_SEARCH: &str = "Step 1: Search for a disease or a target";
const STEP_SELECT: &str = "Step 2: Select a specific target to get Bio Activity";
const SELECTED_HEADING: &str = "Your selected target";
const ACTIVITY_HEADING: &str = "Bio Activity summary for the selected target";
const STEP_EXPORT: &str = "Step 3: Download customized Bio Activity dataset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    Select,
    Activity,
    Export,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Search => "Search",
            Stage::Select => "Select",
            Stage::Activity => "Activity",
            Stage::Export => "Export",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

/// Current widget values for one pass through the workflow.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub query: String,
    pub selected_target: Option<TargetChemblId>,
    pub export_columns: ColumnSelection,
}

impl Interaction {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: TargetChemblId) -> Self {
        self.selected_target = Some(target);
        self
    }

    pub fn with_columns(mut self, columns: ColumnSelection) -> Self {
        self.export_columns = columns;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Title {
        text: String,
    },
    Heading {
        level: u8,
        text: String,
    },
    QueryInput {
        prompt: String,
        value: String,
    },
    Message {
        level: MessageLevel,
        text: String,
    },
    TargetTable {
        table: RecordTable,
    },
    TargetSelect {
        prompt: String,
        options: Vec<String>,
        selected: String,
    },
    SelectedTarget {
        target_chembl_id: String,
        fields: FieldMap,
    },
    ActivityPreview {
        table: RecordTable,
        total_rows: usize,
    },
    ColumnSelect {
        prompt: String,
        options: Vec<String>,
        selected: Vec<String>,
    },
    Download {
        link: DownloadLink,
    },
}

/// Everything the UI should show after one interaction, top to bottom.
#[derive(Debug, Clone, Serialize)]
pub struct Render {
    pub generated_at: String,
    pub blocks: Vec<Block>,
}

impl Render {
    fn new(blocks: Vec<Block>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            blocks,
        }
    }

    pub fn message(&self) -> Option<(MessageLevel, &str)> {
        self.blocks.iter().find_map(|block| match block {
            Block::Message { level, text } => Some((*level, text.as_str())),
            _ => None,
        })
    }

    pub fn target_table(&self) -> Option<&RecordTable> {
        self.blocks.iter().find_map(|block| match block {
            Block::TargetTable { table } => Some(table),
            _ => None,
        })
    }

    pub fn target_options(&self) -> Option<(&[String], &str)> {
        self.blocks.iter().find_map(|block| match block {
            Block::TargetSelect {
                options, selected, ..
            } => Some((options.as_slice(), selected.as_str())),
            _ => None,
        })
    }

    pub fn selected_target(&self) -> Option<(&str, &FieldMap)> {
        self.blocks.iter().find_map(|block| match block {
            Block::SelectedTarget {
                target_chembl_id,
                fields,
            } => Some((target_chembl_id.as_str(), fields)),
            _ => None,
        })
    }

    pub fn activity_preview(&self) -> Option<(&RecordTable, usize)> {
        self.blocks.iter().find_map(|block| match block {
            Block::ActivityPreview { table, total_rows } => Some((table, *total_rows)),
            _ => None,
        })
    }

    pub fn column_options(&self) -> Option<(&[String], &[String])> {
        self.blocks.iter().find_map(|block| match block {
            Block::ColumnSelect {
                options, selected, ..
            } => Some((options.as_slice(), selected.as_slice())),
            _ => None,
        })
    }

    pub fn download(&self) -> Option<&DownloadLink> {
        self.blocks.iter().find_map(|block| match block {
            Block::Download { link } => Some(link),
            _ => None,
        })
    }
}

#[derive(Clone)]
pub struct Dashboard<C: ChemblClient> {
    chembl: C,
}

impl<C: ChemblClient> Dashboard<C> {
    pub fn new(chembl: C) -> Self {
        Self { chembl }
    }

    /// Runs the search → select → activity → export pipeline for the given
    /// widget values. Every call re-issues the remote requests it needs.
    ///
    /// A provider communication failure anywhere abandons the pass and yields
    /// the prompt plus [`RETRY_MESSAGE`]. Other errors are returned.
    pub fn handle(
        &self,
        interaction: &Interaction,
        sink: &dyn ProgressSink,
    ) -> Result<Render, ExplorerError> {
        let query = interaction.query.trim();
        let prompt = vec![
            Block::Title {
                text: TITLE.to_string(),
            },
            heading(2, STEP_SEARCH),
            Block::QueryInput {
                prompt: QUERY_PROMPT.to_string(),
                value: interaction.query.clone(),
            },
        ];
        if query.is_empty() {
            return Ok(Render::new(prompt));
        }

        match self.run_stages(query, interaction, sink) {
            Ok(mut blocks) => {
                let mut all = prompt;
                all.append(&mut blocks);
                Ok(Render::new(all))
            }
            Err(err) if err.is_provider_failure() => {
                tracing::warn!(error = %err, query, "provider request failed");
                sink.event(ProgressEvent {
                    message: format!("stage=Search; request failed: {err}"),
                    elapsed: None,
                });
                let mut all = prompt;
                all.push(Block::Message {
                    level: MessageLevel::Error,
                    text: RETRY_MESSAGE.to_string(),
                });
                Ok(Render::new(all))
            }
            Err(err) => Err(err),
        }
    }

    fn run_stages(
        &self,
        query: &str,
        interaction: &Interaction,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Block>, ExplorerError> {
        let mut blocks = Vec::new();

        emit(sink, Stage::Search, format!("searching targets for `{query}`"), None);
        let start = Instant::now();
        let targets = self.chembl.search_targets(query)?;
        emit(
            sink,
            Stage::Search,
            format!("{} targets", targets.len()),
            Some(start.elapsed()),
        );
        tracing::info!(query, targets = targets.len(), "target search done");

        if targets.is_empty() {
            blocks.push(info(NO_TARGETS_MESSAGE));
            return Ok(blocks);
        }
        blocks.push(Block::TargetTable {
            table: RecordTable::from_targets(&targets),
        });

        let selected = resolve_selection(&targets, interaction.selected_target.as_ref());
        emit(
            sink,
            Stage::Select,
            format!("selected {}", selected.id()),
            None,
        );
        blocks.push(heading(2, STEP_SELECT));
        blocks.push(Block::TargetSelect {
            prompt: TARGET_PROMPT.to_string(),
            options: targets
                .iter()
                .map(|target| target.id().as_str().to_string())
                .collect(),
            selected: selected.id().as_str().to_string(),
        });
        blocks.push(heading(3, SELECTED_HEADING));
        blocks.push(Block::SelectedTarget {
            target_chembl_id: selected.id().as_str().to_string(),
            fields: selected.fields.clone(),
        });

        emit(
            sink,
            Stage::Activity,
            format!("fetching {} activities for {}", StandardType::Ic50, selected.id()),
            None,
        );
        let start = Instant::now();
        let activities = self
            .chembl
            .filter_activities(selected.id(), StandardType::Ic50)?;
        emit(
            sink,
            Stage::Activity,
            format!("{} activities", activities.len()),
            Some(start.elapsed()),
        );
        tracing::info!(
            target_id = %selected.id(),
            activities = activities.len(),
            "activity filter done"
        );

        if activities.is_empty() {
            blocks.push(info(NO_ACTIVITY_MESSAGE));
            return Ok(blocks);
        }
        let table = RecordTable::from_activities(&activities);
        blocks.push(heading(3, ACTIVITY_HEADING));
        blocks.push(Block::ActivityPreview {
            table: table.head(PREVIEW_ROWS),
            total_rows: table.len(),
        });

        let columns = effective_columns(&table, &interaction.export_columns);
        blocks.push(heading(2, STEP_EXPORT));
        blocks.push(Block::ColumnSelect {
            prompt: COLUMN_PROMPT.to_string(),
            options: table.columns().to_vec(),
            selected: columns.columns().to_vec(),
        });

        let link = download_link(&table.project(&columns))?;
        emit(
            sink,
            Stage::Export,
            format!("{} rows x {} columns ready", link.row_count, link.columns.len()),
            None,
        );
        blocks.push(Block::Download { link });

        Ok(blocks)
    }
}

/// Picks the record matching the requested id, falling back to the first
/// record when nothing was requested or the id is not in this result set.
/// With duplicate ids the first match wins.
///
/// `targets` must not be empty.
pub fn resolve_selection<'a>(
    targets: &'a [TargetRecord],
    requested: Option<&TargetChemblId>,
) -> &'a TargetRecord {
    let first = &targets[0];
    let Some(requested) = requested else {
        return first;
    };

    let mut matches = targets.iter().filter(|target| target.id() == requested);
    match matches.next() {
        Some(found) => {
            let extra = matches.count();
            if extra > 0 {
                tracing::warn!(
                    target_id = %requested,
                    duplicates = extra,
                    "target id appears more than once, using first match"
                );
            }
            found
        }
        None => {
            tracing::debug!(
                target_id = %requested,
                fallback = %first.id(),
                "selection not in current results"
            );
            first
        }
    }
}

/// Drops picked columns the activity table does not have.
pub fn effective_columns(table: &RecordTable, requested: &ColumnSelection) -> ColumnSelection {
    let (kept, dropped): (Vec<&String>, Vec<&String>) = requested
        .columns()
        .iter()
        .partition(|column| table.has_column(column));
    if !dropped.is_empty() {
        tracing::warn!(?dropped, "ignoring export columns not present in activity data");
    }
    ColumnSelection::new(kept.into_iter().cloned())
}

fn emit(sink: &dyn ProgressSink, stage: Stage, message: String, elapsed: Option<Duration>) {
    sink.event(ProgressEvent {
        message: format!("stage={}; {message}", stage.label()),
        elapsed,
    });
}

fn heading(level: u8, text: &str) -> Block {
    Block::Heading {
        level,
        text: text.to_string(),
    }
}

fn info(text: &str) -> Block {
    Block::Message {
        level: MessageLevel::Info,
        text: text.to_string(),
    }
}
