use ft_core::app_error::AppResult;
use ft_core::config::SearchSettings;
use ft_core::services::RemoteStore;
use ft_core::staging::StagingArea;
use ft_search::search_records;

/// Prints matching folders one per line; returns whether anything matched.
pub fn run_search(
    remote: &dyn RemoteStore,
    staging: &StagingArea,
    query: &str,
    settings: &SearchSettings,
) -> AppResult<bool> {
    let report = search_records(remote, staging, query, settings)?;
    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.remote_id, skipped.code);
    }
    for folder in report.folders() {
        println!("{folder}");
    }
    Ok(!report.hits.is_empty())
}
