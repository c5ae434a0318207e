use anyhow::Result;

use crate::bookstack::{PageApi, PageUpdate};
use crate::table::append_row;

/// Inputs for one stamping run. Date and version are computed by the
/// caller and threaded through explicitly.
#[derive(Debug, Clone)]
pub struct StampOptions {
    pub book_id: i64,
    pub page_id: i64,
    pub date: String,
    pub version: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct StampReport {
    pub page_id: i64,
    pub book_id: i64,
    pub date: String,
    pub version: String,
    pub html: String,
    pub updated: bool,
}

/// Fetch the page, append the `[date, version]` row to its first table,
/// and push the result back unless this is a dry run.
pub fn stamp_page(api: &mut dyn PageApi, options: &StampOptions) -> Result<StampReport> {
    let page = api.get_page(options.page_id)?;
    let row = [options.date.clone(), options.version.clone()];
    let html = append_row(&page.html, &row)?;

    let updated = if options.dry_run {
        false
    } else {
        api.update_page(
            options.page_id,
            &PageUpdate {
                book_id: options.book_id,
                id: options.page_id,
                html: html.clone(),
                raw_html: html.clone(),
            },
        )?;
        true
    };

    Ok(StampReport {
        page_id: options.page_id,
        book_id: options.book_id,
        date: options.date.clone(),
        version: options.version.clone(),
        html,
        updated,
    })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::{StampOptions, stamp_page};
    use crate::bookstack::{PageApi, PageDetails, PageUpdate};

    #[derive(Default)]
    struct MockApi {
        html: String,
        fetched_pages: Vec<i64>,
        updates: Vec<(i64, PageUpdate)>,
    }

    impl PageApi for MockApi {
        fn get_page(&mut self, page_id: i64) -> Result<PageDetails> {
            self.fetched_pages.push(page_id);
            Ok(PageDetails {
                id: page_id,
                book_id: 7,
                html: self.html.clone(),
                raw_html: self.html.clone(),
            })
        }

        fn update_page(&mut self, page_id: i64, update: &PageUpdate) -> Result<()> {
            self.updates.push((page_id, update.clone()));
            Ok(())
        }
    }

    fn options() -> StampOptions {
        StampOptions {
            book_id: 7,
            page_id: 139,
            date: "12.05.2024".to_string(),
            version: "1.1.3.abcdef".to_string(),
            dry_run: false,
        }
    }

    #[test]
    fn stamp_appends_row_and_pushes_update() {
        let mut api = MockApi {
            html: "<table><tbody></tbody></table>".to_string(),
            ..MockApi::default()
        };

        let report = stamp_page(&mut api, &options()).expect("stamp");
        assert!(report.updated);
        assert_eq!(api.fetched_pages, vec![139]);
        assert_eq!(api.updates.len(), 1);

        let (page_id, update) = &api.updates[0];
        assert_eq!(*page_id, 139);
        assert_eq!(update.book_id, 7);
        assert_eq!(update.id, 139);
        assert_eq!(update.html, update.raw_html);
        assert_eq!(update.html, report.html);
        assert!(update.html.contains("<td>12.05.2024</td>"));
        assert!(update.html.contains("<td>1.1.3.abcdef</td>"));
    }

    #[test]
    fn dry_run_skips_the_remote_update() {
        let mut api = MockApi {
            html: "<table><tbody></tbody></table>".to_string(),
            ..MockApi::default()
        };
        let mut options = options();
        options.dry_run = true;

        let report = stamp_page(&mut api, &options).expect("stamp");
        assert!(!report.updated);
        assert_eq!(api.fetched_pages, vec![139]);
        assert!(api.updates.is_empty());
        assert!(report.html.contains("1.1.3.abcdef"));
    }

    #[test]
    fn page_without_table_still_pushes_rerendered_html() {
        let mut api = MockApi {
            html: "<p>no version table here</p>".to_string(),
            ..MockApi::default()
        };

        let report = stamp_page(&mut api, &options()).expect("stamp");
        assert!(report.updated);
        assert!(!report.html.contains("1.1.3.abcdef"));
        assert!(report.html.contains("no version table here"));
    }
}
