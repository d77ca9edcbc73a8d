use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

use crate::cli::args::{Cli, Commands};
use crate::compute::albedo::vegetation_description;
use crate::epw::{EpwHeader, EpwReader, EpwWriter};
use crate::error::Result;
use crate::hrrr::{HrrrClient, SiteCache};
use crate::models::{Settings, Site};
use crate::processors::{AmyBuilder, Fetcher};
use crate::utils::progress::ProgressReporter;
use crate::utils::time::hourly_range;

pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            site,
            range,
            output_file,
            cache_dir,
            max_workers,
            offline,
            strict,
            rm_cache,
        } => {
            let site = site.to_site()?;
            let (start, end) = range.resolve()?;
            let hours = hourly_range(start, end);
            let cache_dir = cache_dir.unwrap_or_else(|| settings.cache_dir.clone());
            let max_workers = max_workers.unwrap_or(settings.max_workers);

            println!("Generating AMY weather file...");
            println!(
                "Site: {} ({:.2} N, {:.2} E)",
                site.name, site.latitude, site.longitude
            );
            println!("Period: {} to {} ({} hours)", start, end, hours.len());

            let cache = SiteCache::create(&cache_dir, &site)?;
            let client = HrrrClient::new(settings.base_url.clone())?;
            let fetcher = Fetcher::new(client, cache, site.clone()).with_max_workers(max_workers);

            if !offline {
                fetcher.ensure_site_metadata(hours[0]).await?;
                let to_fetch = fetcher.cache().uncached_hours(&hours).len();
                let progress =
                    ProgressReporter::new(to_fetch as u64, "Downloading HRRR analyses...", false);
                let summary = fetcher.fetch_range(&hours, Some(&progress)).await?;
                progress.finish_with_message("Download complete");
                println!("\n{}", summary.summary());
            }

            let cache = fetcher.into_cache();
            let builder = AmyBuilder::new(site.clone()).with_strict(strict);
            let (records, report) = builder.build(&cache, &hours)?;
            println!("\n{}", report.summary());

            let output_file =
                output_file.unwrap_or_else(|| default_output_file(&site, start, end));
            let header = EpwHeader::for_site(&site, start, end);
            EpwWriter::new().write(&header, &records, &output_file)?;
            println!(
                "Wrote {} records to {}",
                records.len(),
                output_file.display()
            );

            if rm_cache {
                cache.purge()?;
                println!("Removed site cache");
            }

            println!("Generation complete!");
        }

        Commands::Fetch {
            site,
            range,
            cache_dir,
            max_workers,
        } => {
            let site = site.to_site()?;
            let (start, end) = range.resolve()?;
            let hours = hourly_range(start, end);
            let cache_dir = cache_dir.unwrap_or_else(|| settings.cache_dir.clone());
            let max_workers = max_workers.unwrap_or(settings.max_workers);

            println!("Fetching HRRR point data...");
            println!(
                "Site: {} ({:.2} N, {:.2} E)",
                site.name, site.latitude, site.longitude
            );
            println!("Period: {} to {} ({} hours)", start, end, hours.len());

            let cache = SiteCache::create(&cache_dir, &site)?;
            let client = HrrrClient::new(settings.base_url.clone())?;
            let fetcher = Fetcher::new(client, cache, site).with_max_workers(max_workers);

            fetcher.ensure_site_metadata(hours[0]).await?;
            let to_fetch = fetcher.cache().uncached_hours(&hours).len();
            let progress =
                ProgressReporter::new(to_fetch as u64, "Downloading HRRR analyses...", false);
            let summary = fetcher.fetch_range(&hours, Some(&progress)).await?;
            progress.finish_with_message("Download complete");

            println!("\n{}", summary.summary());
            if !summary.failed.is_empty() {
                println!("Re-run to retry the failed hours");
            }
        }

        Commands::Status {
            site,
            range,
            cache_dir,
        } => {
            let site = site.to_site()?;
            let (start, end) = range.resolve()?;
            let hours = hourly_range(start, end);
            let cache_dir = cache_dir.unwrap_or_else(|| settings.cache_dir.clone());

            let cache = SiteCache::create(&cache_dir, &site)?;
            let missing = cache.uncached_hours(&hours);

            println!("Cache directory: {}", cache.path().display());
            println!(
                "{} of {} hours cached for {} to {}",
                hours.len() - missing.len(),
                hours.len(),
                start,
                end
            );
            if let Some(first) = missing.first() {
                println!("First uncached hour: {}", first);
            }

            match cache.read_metadata()? {
                Some(meta) => {
                    let description = meta
                        .vegetation_type
                        .and_then(vegetation_description)
                        .unwrap_or("unknown");
                    match meta.albedo {
                        Some(albedo) => {
                            println!("Land use: {} (albedo {:.2})", description, albedo)
                        }
                        None => println!("Land use: {} (no albedo)", description),
                    }
                }
                None => println!("Site metadata not yet fetched"),
            }
        }

        Commands::Inspect { file, sample } => {
            println!("Inspecting EPW file: {}", file.display());

            let reader = EpwReader::new();
            let summary = reader.summarize(&file)?;
            println!("\n{}", summary.detailed_summary());

            if sample > 0 {
                let rows = reader.sample_rows(&file, sample)?;
                println!("\nSample records (showing {}):", rows.len());
                for row in rows {
                    println!("  {}", row);
                }
            }
        }
    }

    Ok(())
}

/// `{site}-{year}.epw` for whole calendar years, date-stamped otherwise.
fn default_output_file(site: &Site, start: NaiveDate, end: NaiveDate) -> PathBuf {
    let full_year = start.year() == end.year()
        && start.ordinal() == 1
        && (end.month(), end.day()) == (12, 31);
    if full_year {
        PathBuf::from(format!("{}-{}.epw", site.cache_key(), start.year()))
    } else {
        PathBuf::from(format!(
            "{}-{}-{}.epw",
            site.cache_key(),
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_file_names() {
        let site = Site::new(Some("San Antonio".to_string()), 29.25, -98.31, None).unwrap();

        let year = default_output_file(
            &site,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        );
        assert_eq!(year, PathBuf::from("san_antonio-2022.epw"));

        let partial = default_output_file(
            &site,
            NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 5, 31).unwrap(),
        );
        assert_eq!(partial, PathBuf::from("san_antonio-20220301-20220531.epw"));
    }
}
