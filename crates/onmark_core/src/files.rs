use std::collections::BTreeMap;

use crate::seeded::Lcg;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub String);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Column names given to every uploaded file.
pub const UPLOAD_COLUMNS: [&str; 5] = ["id", "timestamp", "value", "category", "status"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    /// `YYYY-MM-DD`.
    pub upload_date: String,
    pub row_count: u64,
    pub columns: Vec<String>,
    pub database_link: Option<String>,
    /// Column name -> id of the file that column links to.
    pub related_files: BTreeMap<String, FileId>,
}

impl FileRecord {
    /// Builds the record for an uploaded file. Row count and database link
    /// are placeholders drawn from `rng`.
    pub(crate) fn from_upload(
        id: FileId,
        pending: &PendingUpload,
        upload_date: &str,
        rng: &mut Lcg,
    ) -> Self {
        let row_count = u64::from(rng.next_in_range(1_000, 50_999));
        let database_link = rng.next_bool().then(|| {
            let stem = pending.name.split('.').next().unwrap_or_default();
            format!("https://db.company.com/{stem}")
        });
        Self {
            id,
            name: pending.name.clone(),
            size: pending.size,
            upload_date: upload_date.to_owned(),
            row_count,
            columns: UPLOAD_COLUMNS.iter().map(|c| (*c).to_owned()).collect(),
            database_link,
            related_files: BTreeMap::new(),
        }
    }

    pub fn related_file(&self, column: &str) -> Option<&FileId> {
        self.related_files.get(column)
    }
}

/// One row of the fixed sample shown in every discovery view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewRecord {
    pub id: u32,
    pub timestamp: &'static str,
    pub value_cents: u64,
    pub category: &'static str,
    pub status: &'static str,
}

/// Header of the record preview; matches [`PreviewRecord`]'s fields.
pub const PREVIEW_COLUMNS: [&str; 5] = UPLOAD_COLUMNS;

pub const PREVIEW_RECORDS: [PreviewRecord; 8] = [
    preview(1, "2024-01-15 10:30:00", 125_075, "Sales", "Complete"),
    preview(2, "2024-01-15 10:31:00", 85_620, "Marketing", "Pending"),
    preview(3, "2024-01-15 10:32:00", 210_050, "Sales", "Complete"),
    preview(4, "2024-01-15 10:33:00", 67_530, "Support", "Processing"),
    preview(5, "2024-01-15 10:34:00", 189_075, "Sales", "Complete"),
    preview(6, "2024-01-15 10:35:00", 44_520, "Marketing", "Pending"),
    preview(7, "2024-01-15 10:36:00", 145_680, "Support", "Complete"),
    preview(8, "2024-01-15 10:37:00", 78_945, "Sales", "Processing"),
];

const fn preview(
    id: u32,
    timestamp: &'static str,
    value_cents: u64,
    category: &'static str,
    status: &'static str,
) -> PreviewRecord {
    PreviewRecord {
        id,
        timestamp,
        value_cents,
        category,
        status,
    }
}

impl PreviewRecord {
    /// Cells in [`PREVIEW_COLUMNS`] order, the value as dollars.
    pub fn cells(&self) -> [String; 5] {
        [
            self.id.to_string(),
            self.timestamp.to_owned(),
            format!("${}.{:02}", self.value_cents / 100, self.value_cents % 100),
            self.category.to_owned(),
            self.status.to_owned(),
        ]
    }
}

/// A file the user picked that has not finished "processing" yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileCollection {
    files: Vec<FileRecord>,
}

impl FileCollection {
    pub fn from_records(files: Vec<FileRecord>) -> Self {
        Self { files }
    }

    /// The five sample datasets the workspace starts with.
    pub fn sample() -> Self {
        let record = |id: &str,
                      name: &str,
                      size: u64,
                      date: &str,
                      rows: u64,
                      columns: &[&str],
                      link: Option<&str>,
                      related: &[(&str, &str)]| FileRecord {
            id: FileId::from(id),
            name: name.to_owned(),
            size,
            upload_date: date.to_owned(),
            row_count: rows,
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            database_link: link.map(ToOwned::to_owned),
            related_files: related
                .iter()
                .map(|(column, file)| ((*column).to_owned(), FileId::from(*file)))
                .collect(),
        };

        Self::from_records(vec![
            record(
                "1",
                "sales_data_q1.csv",
                2_048_000,
                "2024-01-15",
                15_420,
                &["date", "product_id", "customer_id", "revenue", "quantity"],
                Some("https://analytics.company.com/db/sales_q1"),
                &[("product_id", "4"), ("customer_id", "5")],
            ),
            record(
                "2",
                "user_behavior.xlsx",
                5_120_000,
                "2024-01-10",
                45_230,
                &["user_id", "session_id", "event_type", "timestamp", "page_url"],
                None,
                &[("user_id", "5")],
            ),
            record(
                "3",
                "inventory_levels.json",
                1_024_000,
                "2024-01-08",
                2_340,
                &["product_id", "warehouse_location", "stock_count", "last_updated"],
                Some("https://inventory.company.com/live"),
                &[("product_id", "4")],
            ),
            record(
                "4",
                "products_catalog.csv",
                3_072_000,
                "2024-01-05",
                8_750,
                &["product_id", "name", "category", "price", "description"],
                Some("https://catalog.company.com/products"),
                &[],
            ),
            record(
                "5",
                "customers_database.xlsx",
                4_096_000,
                "2024-01-03",
                12_540,
                &["customer_id", "name", "email", "registration_date", "tier"],
                Some("https://crm.company.com/customers"),
                &[],
            ),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn get(&self, id: &FileId) -> Option<&FileRecord> {
        self.files.iter().find(|file| &file.id == id)
    }

    pub fn add(&mut self, records: impl IntoIterator<Item = FileRecord>) {
        self.files.extend(records);
    }

    /// Returns true when a file was removed.
    pub fn remove(&mut self, id: &FileId) -> bool {
        let before = self.files.len();
        self.files.retain(|file| &file.id != id);
        self.files.len() != before
    }

    /// Case-insensitive substring match on the file name; empty term matches all.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a FileRecord> + 'a {
        let needle = term.trim().to_lowercase();
        self.files
            .iter()
            .filter(move |file| file.name.to_lowercase().contains(&needle))
    }

    pub fn total_rows(&self) -> u64 {
        self.files.iter().map(|file| file.row_count).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|file| file.size).sum()
    }
}
