mod tui;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use jobtrack::analytics::{self, RECENT_LIMIT};
use jobtrack::draft::{CompanyDraft, InterviewDraft, JobDraft, parse_clock, parse_date};
use jobtrack::{
    Interview, InterviewStatus, InterviewType, Job, JobQuery, JobStatus, SortDirection, SortKey,
    SqliteKv, StatusFilter, Tracker,
};

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Track job applications, interviews, and companies")]
struct Cli {
    /// Path to the data file (defaults to the per-user data directory)
    #[arg(long, global = true, env = "JOBTRACK_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary, upcoming interviews, and recent applications
    Dashboard,

    /// Status distribution, monthly applications, and rates
    Analytics {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive terminal dashboard
    Browse {
        /// Initial search text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Initial status filter (all, applied, screening, ...)
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },

    /// Manage job applications
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Manage interviews
    Interview {
        #[command(subcommand)]
        command: InterviewCommands,
    },

    /// Manage companies
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },
}

#[derive(Args)]
struct JobFields {
    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    position: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    salary: Option<String>,

    /// applied, screening, interview, technical, final, offer, rejected, withdrawn
    #[arg(long)]
    status: Option<JobStatus>,

    /// Date applied (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    applied: Option<NaiveDate>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    contact: Option<String>,

    #[arg(long)]
    email: Option<String>,
}

impl From<JobFields> for JobDraft {
    fn from(f: JobFields) -> Self {
        JobDraft {
            company: f.company,
            position: f.position,
            location: f.location,
            salary: f.salary,
            status: f.status,
            applied_date: f.applied,
            description: f.description,
            notes: f.notes,
            url: f.url,
            contact_person: f.contact,
            contact_email: f.email,
        }
    }
}

#[derive(Subcommand)]
enum JobCommands {
    /// Record a new application
    Add {
        #[command(flatten)]
        fields: JobFields,
    },

    /// Edit an application; only the given fields change
    Edit {
        id: String,

        #[command(flatten)]
        fields: JobFields,
    },

    /// Move an application to a new status
    Status { id: String, status: JobStatus },

    /// List applications
    List {
        /// Match company, position, or location
        #[arg(short, long, default_value = "")]
        search: String,

        /// Filter by status, or "all"
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// applied, company, position, status, updated, created
        #[arg(long, default_value = "applied")]
        sort: SortKey,

        /// Oldest / A-Z first
        #[arg(long)]
        asc: bool,
    },

    /// Show an application and its interviews
    Show { id: String },

    /// Delete an application and its interviews
    Delete { id: String },
}

#[derive(Args)]
struct InterviewFields {
    /// Job id this interview belongs to
    #[arg(long)]
    job: Option<String>,

    /// phone, video, onsite, technical
    #[arg(long)]
    kind: Option<InterviewType>,

    /// YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// HH:MM
    #[arg(long, value_parser = parse_clock)]
    time: Option<NaiveTime>,

    #[arg(long)]
    interviewer: Option<String>,

    #[arg(long)]
    notes: Option<String>,

    #[arg(long)]
    feedback: Option<String>,

    /// scheduled, completed, cancelled
    #[arg(long)]
    status: Option<InterviewStatus>,
}

impl From<InterviewFields> for InterviewDraft {
    fn from(f: InterviewFields) -> Self {
        InterviewDraft {
            job_id: f.job,
            kind: f.kind,
            date: f.date,
            time: f.time,
            interviewer: f.interviewer,
            notes: f.notes,
            feedback: f.feedback,
            status: f.status,
        }
    }
}

#[derive(Subcommand)]
enum InterviewCommands {
    /// Schedule an interview
    Add {
        #[command(flatten)]
        fields: InterviewFields,
    },

    /// Edit an interview; only the given fields change
    Edit {
        id: String,

        #[command(flatten)]
        fields: InterviewFields,
    },

    /// List interviews
    List {
        /// Only scheduled interviews from today on
        #[arg(short, long)]
        upcoming: bool,

        /// Only interviews for this job
        #[arg(long)]
        job: Option<String>,
    },

    /// Delete an interview
    Delete { id: String },
}

#[derive(Subcommand)]
enum CompanyCommands {
    /// Add a company
    Add {
        name: String,

        #[arg(long)]
        industry: Option<String>,

        #[arg(long)]
        size: Option<String>,

        #[arg(long)]
        website: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List companies
    List,

    /// Delete a company
    Delete { id: String },
}

fn open_tracker(db: Option<PathBuf>) -> Result<Tracker<SqliteKv>> {
    let kv = match db {
        Some(path) => SqliteKv::open(&path)
            .with_context(|| format!("Failed to open data file {}", path.display()))?,
        None => SqliteKv::open_default().context("Failed to open default data file")?,
    };
    let tracker = Tracker::new(kv);
    debug!(path = ?tracker.kv().path(), "opened data file");
    Ok(tracker)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn main() -> Result<()> {
    jobtrack::logging::init();
    let cli = Cli::parse();
    let tracker = open_tracker(cli.db)?;

    match cli.command {
        Commands::Dashboard => print_dashboard(&tracker),

        Commands::Analytics { json } => {
            let report = analytics::analytics(&tracker.jobs());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_analytics(&report);
            }
        }

        Commands::Browse { search, status } => {
            let query = JobQuery::new().search(search).status(status);
            tui::run_browse(&tracker, query)?;
        }

        Commands::Job { command } => run_job(&tracker, command)?,
        Commands::Interview { command } => run_interview(&tracker, command)?,
        Commands::Company { command } => run_company(&tracker, command)?,
    }

    Ok(())
}

fn run_job(tracker: &Tracker<SqliteKv>, command: JobCommands) -> Result<()> {
    match command {
        JobCommands::Add { fields } => {
            let job = JobDraft::from(fields).into_job(None, today(), Utc::now())?;
            let job = tracker.save_job(job)?;
            println!("Added job {} ({} at {})", job.id, job.position, job.company);
        }

        JobCommands::Edit { id, fields } => {
            let existing = find_job(tracker, &id)?;
            let job = JobDraft::from(&existing)
                .overlay(fields.into())
                .into_job(Some(&existing), today(), Utc::now())?;
            tracker.save_job(job)?;
            println!("Updated job {}", id);
        }

        JobCommands::Status { id, status } => {
            let mut job = find_job(tracker, &id)?;
            job.status = status;
            tracker.save_job(job)?;
            println!("Job {} is now {}", id, status.label());
        }

        JobCommands::List {
            search,
            status,
            sort,
            asc,
        } => {
            let direction = if asc {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
            let query = JobQuery::new().search(search).status(status).sort(sort, direction);
            let jobs = query.apply(&tracker.jobs());
            if jobs.is_empty() {
                println!("No jobs found.");
            } else {
                print_job_table(&jobs);
            }
        }

        JobCommands::Show { id } => {
            let job = find_job(tracker, &id)?;
            print_job(&job);
            let interviews = tracker.interviews_for_job(&job.id);
            if !interviews.is_empty() {
                println!("\nInterviews ({}):", interviews.len());
                for interview in interviews {
                    println!(
                        "  {} {} {} {:<10} {}",
                        interview.id,
                        interview.date,
                        interview.time.format("%H:%M"),
                        interview.kind,
                        interview.status
                    );
                }
            }
        }

        JobCommands::Delete { id } => {
            let outcome = tracker.delete_job(&id)?;
            if outcome.job_removed {
                println!(
                    "Deleted job {} and {} interview(s).",
                    id, outcome.interviews_removed
                );
            } else {
                println!("Job {} not found.", id);
            }
        }
    }
    Ok(())
}

fn run_interview(tracker: &Tracker<SqliteKv>, command: InterviewCommands) -> Result<()> {
    match command {
        InterviewCommands::Add { fields } => {
            let interview = InterviewDraft::from(fields).into_interview(None, Utc::now())?;
            let jobs = tracker.jobs();
            let interview = tracker.save_interview(interview)?;
            println!(
                "Scheduled {} interview {} for {}",
                interview.kind,
                interview.id,
                analytics::job_label(&jobs, &interview.job_id)
            );
        }

        InterviewCommands::Edit { id, fields } => {
            let existing = tracker
                .get_interview(&id)
                .ok_or_else(|| anyhow!("Interview {} not found", id))?;
            let interview = InterviewDraft::from(&existing)
                .overlay(fields.into())
                .into_interview(Some(&existing), Utc::now())?;
            tracker.save_interview(interview)?;
            println!("Updated interview {}", id);
        }

        InterviewCommands::List { upcoming, job } => {
            let jobs = tracker.jobs();
            let mut interviews = if upcoming {
                analytics::upcoming_interviews(&tracker.interviews(), today())
            } else {
                let mut all = tracker.interviews();
                all.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
                all
            };
            if let Some(job_id) = job {
                interviews.retain(|i| i.job_id == job_id);
            }
            if interviews.is_empty() {
                println!("No interviews found.");
            } else {
                print_interview_table(&interviews, &jobs);
            }
        }

        InterviewCommands::Delete { id } => {
            if tracker.delete_interview(&id)? {
                println!("Deleted interview {}.", id);
            } else {
                println!("Interview {} not found.", id);
            }
        }
    }
    Ok(())
}

fn run_company(tracker: &Tracker<SqliteKv>, command: CompanyCommands) -> Result<()> {
    match command {
        CompanyCommands::Add {
            name,
            industry,
            size,
            website,
            notes,
        } => {
            let company = CompanyDraft {
                name: Some(name),
                industry,
                size,
                website,
                notes,
            }
            .into_company(None)?;
            let company = tracker.save_company(company)?;
            println!("Added company {} ({})", company.id, company.name);
        }

        CompanyCommands::List => {
            let mut companies = tracker.companies();
            companies.sort_by_key(|c| c.name.to_lowercase());
            if companies.is_empty() {
                println!("No companies found.");
            } else {
                println!(
                    "{:<22} {:<24} {:<16} {:<10} {:<30}",
                    "ID", "NAME", "INDUSTRY", "SIZE", "WEBSITE"
                );
                println!("{}", "-".repeat(106));
                for c in companies {
                    println!(
                        "{:<22} {:<24} {:<16} {:<10} {:<30}",
                        c.id,
                        truncate(&c.name, 22),
                        truncate(&c.industry.unwrap_or_default(), 14),
                        truncate(&c.size.unwrap_or_default(), 8),
                        truncate(&c.website.unwrap_or_default(), 28)
                    );
                }
            }
        }

        CompanyCommands::Delete { id } => {
            if tracker.delete_company(&id)? {
                println!("Deleted company {}.", id);
            } else {
                println!("Company {} not found.", id);
            }
        }
    }
    Ok(())
}

fn find_job(tracker: &Tracker<SqliteKv>, id: &str) -> Result<Job> {
    tracker
        .get_job(id)
        .ok_or_else(|| anyhow!("Job {} not found", id))
}

fn print_dashboard(tracker: &Tracker<SqliteKv>) {
    let snapshot = tracker.snapshot();
    let summary = analytics::dashboard_summary(&snapshot.jobs, &snapshot.interviews);

    println!(
        "Applications: {:<6} Active: {:<6} Interviews: {:<6}",
        summary.total, summary.active, summary.interviews
    );
    println!(
        "Offers:       {:<6} Rejected: {:<4} Response rate: {}%",
        summary.offers, summary.rejections, summary.response_rate
    );

    let upcoming = analytics::upcoming_interviews(&snapshot.interviews, today());
    println!("\nUpcoming interviews:");
    if upcoming.is_empty() {
        println!("  none scheduled");
    } else {
        print_interview_table(&upcoming, &snapshot.jobs);
    }

    let recent = analytics::recent_jobs(&snapshot.jobs, RECENT_LIMIT);
    println!("\nRecent applications:");
    if recent.is_empty() {
        println!("  none yet - add one with `jobtrack job add --company ... --position ...`");
    } else {
        print_job_table(&recent);
    }
}

fn print_analytics(report: &analytics::Analytics) {
    if report.total_applications == 0 {
        println!("Add some job applications to see analytics.");
        return;
    }

    println!("Total applications: {}", report.total_applications);
    println!("Response rate:      {}%", report.response_rate);
    println!("Interview rate:     {}%", report.interview_rate);
    println!("Offer rate:         {}%", report.offer_rate);
    println!("Offers received:    {}", report.offers);

    println!("\n{:<12} {:>6} {:>6}", "STATUS", "COUNT", "PCT");
    println!("{}", "-".repeat(26));
    for bucket in &report.status_distribution {
        println!("{:<12} {:>6} {:>5}%", bucket.label, bucket.count, bucket.percentage);
    }

    println!("\n{:<10} {:>6}", "MONTH", "APPS");
    println!("{}", "-".repeat(17));
    for month in &report.monthly_applications {
        println!("{:<10} {:>6}  {}", month.label, month.count, "#".repeat(month.count));
    }
}

fn print_job_table(jobs: &[Job]) {
    println!(
        "{:<22} {:<12} {:<24} {:<22} {:<11} {:<16}",
        "ID", "STATUS", "POSITION", "COMPANY", "APPLIED", "LOCATION"
    );
    println!("{}", "-".repeat(112));
    for job in jobs {
        println!(
            "{:<22} {:<12} {:<24} {:<22} {:<11} {:<16}",
            job.id,
            job.status.label(),
            truncate(&job.position, 22),
            truncate(&job.company, 20),
            job.applied_date.to_string(),
            truncate(job.location.as_deref().unwrap_or("-"), 16)
        );
    }
}

fn print_interview_table(interviews: &[Interview], jobs: &[Job]) {
    println!(
        "{:<22} {:<11} {:<6} {:<10} {:<10} {:<36}",
        "ID", "DATE", "TIME", "TYPE", "STATUS", "JOB"
    );
    println!("{}", "-".repeat(100));
    for interview in interviews {
        println!(
            "{:<22} {:<11} {:<6} {:<10} {:<10} {:<36}",
            interview.id,
            interview.date.to_string(),
            interview.time.format("%H:%M").to_string(),
            interview.kind,
            interview.status,
            truncate(&analytics::job_label(jobs, &interview.job_id), 36)
        );
    }
}

fn print_job(job: &Job) {
    println!("Job {}", job.id);
    println!("Position: {}", job.position);
    println!("Company: {}", job.company);
    println!("Status: {}", job.status.label());
    println!("Applied: {}", job.applied_date);
    if let Some(location) = &job.location {
        println!("Location: {}", location);
    }
    if let Some(salary) = &job.salary {
        println!("Salary: {}", salary);
    }
    if let Some(url) = &job.url {
        println!("URL: {}", url);
    }
    match (&job.contact_person, &job.contact_email) {
        (Some(name), Some(email)) => println!("Contact: {} <{}>", name, email),
        (Some(name), None) => println!("Contact: {}", name),
        (None, Some(email)) => println!("Contact: {}", email),
        (None, None) => {}
    }
    println!("Created: {}", job.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", job.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(notes) = &job.notes {
        println!("\n--- Notes ---\n{}", notes);
    }
    if let Some(description) = &job.description {
        println!("\n--- Description ---\n{}", description);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
