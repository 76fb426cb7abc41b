use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use srvcat::filters::RawQuery;
use srvcat::import::{import_file, ImportOptions, ImportProgress};
use srvcat::store::{load_snapshot, save_snapshot, InMemoryCatalogStore};
use srvcat::{CatalogService, Currency, DiskType, ImportError};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

const SHEET: &str = "Model,RAM,HDD,Location,Price
Dell R210Intel Xeon X3440,16GBDDR3,2x2TBSATA2,AmsterdamAMS-01,€49.99

HP DL380eG82x Intel Xeon E5-2420,32GBDDR3,8x2TBSATA2,SingaporeSIN-11,S$565.99
";

fn catalog() -> (CatalogService, InMemoryCatalogStore) {
    let store = InMemoryCatalogStore::new();
    let catalog = CatalogService::new(Arc::new(store.clone()), Duration::from_secs(60));
    (catalog, store)
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run(catalog: &CatalogService, path: &Path, dry_run: bool) -> Result<srvcat::import::ImportSummary, ImportError> {
    let options = ImportOptions { batch_size: 100, dry_run };
    import_file(catalog, path, options, &mut |_: &ImportProgress| {})
}

#[test]
fn test_csv_import_creates_records_and_skips_blank_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "servers.csv", SHEET);
    let (catalog, _) = catalog();

    let summary = run(&catalog, &path, false).unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.skipped, 1);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.rows_read, 3);

    let raw = RawQuery::from_pairs(vec![("ram".to_string(), "16GB".to_string())]);
    let (_, result) = catalog.search(&raw);
    assert_eq!(result.total(), 1);
    let record = &result.data[0];
    assert_eq!(record.ram_size_gb, 16);
    assert_eq!(record.storage_total_gb, 4000);
    assert_eq!(record.disk_type, DiskType::Sata);
    assert_eq!(record.currency, Currency::Eur);
    assert_eq!(record.price_amount.to_string(), "49.99");
}

#[test]
fn test_reimport_updates_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "servers.csv", SHEET);
    let (catalog, _) = catalog();

    run(&catalog, &path, false).unwrap();
    let first_ids: Vec<u64> = catalog.search(&RawQuery::default()).1.data.iter().map(|r| r.id).collect();

    let summary = run(&catalog, &path, false).unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.updated, 2);
    assert_eq!(catalog.len(), 2);

    let second_ids: Vec<u64> = catalog.search(&RawQuery::default()).1.data.iter().map(|r| r.id).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn test_reimport_refreshes_cached_pages() {
    let dir = TempDir::new().unwrap();
    let (catalog, _) = catalog();
    run(&catalog, &write_file(&dir, "a.csv", SHEET), false).unwrap();
    assert_eq!(catalog.search(&RawQuery::default()).1.total(), 2);

    let extra = "model,ram,hdd,location,price\nNew Box,64GBDDR4,2x480GBSSD,DallasDAL-10,$120.00\n";
    run(&catalog, &write_file(&dir, "b.csv", extra), false).unwrap();
    assert_eq!(catalog.search(&RawQuery::default()).1.total(), 3);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "servers.csv", SHEET);
    let (catalog, _) = catalog();

    let summary = run(&catalog, &path, true).unwrap();
    assert!(summary.dry_run);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 1);
    assert!(catalog.is_empty());
}

#[test]
fn test_bad_rows_are_reported_with_row_numbers() {
    let dir = TempDir::new().unwrap();
    let contents = "Model,RAM,HDD,Location,Price\nGood,16GBDDR3,2x2TBSATA2,AMS,49.99\nBad,16GBDDR3,2x2TBSATA2,FRA,4.9.9\n";
    let path = write_file(&dir, "servers.csv", contents);
    let (catalog, _) = catalog();

    let summary = run(&catalog, &path, false).unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("Row 3:"), "{}", summary.errors[0]);
}

#[test]
fn test_blank_lines_are_skipped_and_keep_row_numbers() {
    let dir = TempDir::new().unwrap();
    let contents = "Model,RAM,HDD,Location,Price
A,16GBDDR3,2x2TBSATA2,AMS,49.99

B,32GBDDR3,2x2TBSATA2,SIN,S$100
C,8GBDDR3,2x2TBSATA2,FRA,1.2.3
";
    let path = write_file(&dir, "servers.csv", contents);
    let (catalog, _) = catalog();

    let summary = run(&catalog, &path, false).unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.rows_read, 4);
    assert_eq!(summary.errors, vec!["Row 5: invalid price amount \"1.2.3\"".to_string()]);
}

#[test]
fn test_xlsx_import_reads_first_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("servers.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, title) in ["Model", "RAM", "HDD", "Location", "Price"].iter().enumerate() {
        sheet.write_string(0, col as u16, *title).unwrap();
    }
    for (col, value) in ["Dell R210Intel Xeon X3440", "16GBDDR3", "2x2TBSATA2", "AmsterdamAMS-01"].iter().enumerate() {
        sheet.write_string(1, col as u16, *value).unwrap();
    }
    sheet.write_number(1, 4, 49.99).unwrap();
    // Row 3 left empty.
    for (col, value) in ["HP DL380", "32GBDDR4", "4x480GBSSD", "SingaporeSIN-11", "S$100"].iter().enumerate() {
        sheet.write_string(3, col as u16, *value).unwrap();
    }
    sheet.write_string(4, 0, "Broken").unwrap();
    sheet.write_string(4, 4, "1.2.3").unwrap();
    workbook.save(&path).unwrap();

    let (catalog, _) = catalog();
    let summary = run(&catalog, &path, false).unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("Row 5:"), "{}", summary.errors[0]);

    let raw = RawQuery::from_pairs(vec![("ram".to_string(), "16GB".to_string())]);
    let (_, result) = catalog.search(&raw);
    assert_eq!(result.total(), 1);
    let record = &result.data[0];
    assert_eq!(record.ram_size_gb, 16);
    assert_eq!(record.storage_total_gb, 4000);
    assert_eq!(record.disk_type, DiskType::Sata);
    assert_eq!(record.currency, Currency::Eur);
    assert_eq!(record.price_amount.to_string(), "49.99");

    let sgd = catalog.search(&RawQuery::from_pairs(vec![("ram", "32GB")])).1;
    assert_eq!(sgd.data[0].currency, Currency::Sgd);
}

#[test]
fn test_unresolved_header_fails_without_writes() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "servers.csv", "Name,Memory,Location\nA,16GB,AMS\n");
    let (catalog, _) = catalog();

    match run(&catalog, &path, false) {
        Err(ImportError::UnresolvedColumns(missing)) => {
            assert_eq!(missing, vec!["storage".to_string(), "price".to_string()]);
        }
        other => panic!("expected unresolved columns, got {:?}", other),
    }
    assert!(catalog.is_empty());
}

#[test]
fn test_unsupported_extension_and_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "servers.txt", SHEET);
    let (catalog, _) = catalog();

    assert!(matches!(run(&catalog, &path, false), Err(ImportError::UnsupportedExtension(_))));
    let missing = dir.path().join("nope.xlsx");
    assert!(matches!(run(&catalog, &missing, false), Err(ImportError::FileNotFound(_))));
    assert!(catalog.is_empty());
}

#[test]
fn test_imported_catalog_survives_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "servers.csv", SHEET);
    let (catalog, store) = catalog();
    run(&catalog, &path, false).unwrap();

    let data_file = dir.path().join("catalog.json");
    save_snapshot(&data_file, &store.snapshot()).unwrap();

    let restored = InMemoryCatalogStore::from_snapshot(load_snapshot(&data_file).unwrap().unwrap()).unwrap();
    let catalog = CatalogService::new(Arc::new(restored), Duration::from_secs(60));
    assert_eq!(catalog.len(), 2);

    let summary = run(&catalog, &path, false).unwrap();
    assert_eq!(summary.updated, 2);
    assert_eq!(catalog.len(), 2);
}
