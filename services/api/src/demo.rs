use crate::infra::{parse_score, parse_task_filter, InMemoryLoanLedger, InMemorySessionStore};
use crate::server::load_data_source;
use chrono::Utc;
use clap::Args;
use karma_passport::config::SessionConfig;
use karma_passport::dashboard::TaskBoardView;
use karma_passport::data::{DashboardDataSource, MockDataSource};
use karma_passport::error::AppError;
use karma_passport::karma::KarmaInsights;
use karma_passport::loans::{
    check_can_apply, format_amount, format_due_date, LoanApplicationService, LoanQuote,
    QuoteRequest,
};
use karma_passport::session::{
    navigation_for, resolve, AuthMode, LoginForm, RouteDecision, SessionService,
};
use karma_passport::tasks::TaskFilter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Requested amount in the borrower's base currency
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) principal: i64,
    /// Loan duration in days; must be one of the offered durations
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) duration: i64,
    /// Karma score to price against (defaults to the borrower's own score)
    #[arg(long, value_parser = parse_score)]
    pub(crate) score: Option<u8>,
}

#[derive(Args, Debug)]
pub(crate) struct TasksArgs {
    /// Status filter: all, active, pending-review, completed, or rejected
    #[arg(long, default_value = "all", value_parser = parse_task_filter)]
    pub(crate) status: TaskFilter,
    /// Task CSV export used instead of the built-in demo tasks
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Task CSV export used instead of the built-in demo tasks
    #[arg(long)]
    pub(crate) tasks_csv: Option<PathBuf>,
    /// Amount requested in the loan portion of the demo
    #[arg(long, default_value_t = 5_000)]
    pub(crate) principal: i64,
    /// Duration in days for the loan portion of the demo
    #[arg(long, default_value_t = 30)]
    pub(crate) duration: i64,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let data = Arc::new(MockDataSource::default());
    let service = LoanApplicationService::new(data, Arc::new(InMemoryLoanLedger::default()));
    let request = QuoteRequest {
        principal: args.principal,
        duration_days: args.duration,
        reputation_score: args.score.map(i64::from),
    };
    let (terms, quote) = service.quote_with_terms(request, Utc::now())?;
    render_quote(&terms.base_currency, &quote);
    Ok(())
}

pub(crate) fn run_tasks(args: TasksArgs) -> Result<(), AppError> {
    let data = load_data_source(args.csv)?;
    let tasks = data.fetch_tasks()?;
    render_task_board(&TaskBoardView::build(&tasks, args.status));
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = Utc::now();
    let data = Arc::new(load_data_source(args.tasks_csv)?);
    let sessions = SessionService::new(
        Arc::new(InMemorySessionStore::default()),
        SessionConfig::default().ttl(),
    );

    println!("Karma Passport demo");
    println!(
        "- Visiting /my-tasks signed out -> {}",
        describe(resolve("/my-tasks", None, now))
    );

    let session = sessions.login(
        &LoginForm {
            email: "priya.nair@karmapassport.dev".to_string(),
            password: "demo".to_string(),
            name: "Priya Nair".to_string(),
            mode: AuthMode::Signup,
            role: None,
        },
        now,
    )?;
    println!(
        "- Signed in as {} ({}) until {}",
        session.user.name,
        session.user.role.label(),
        session.expires_at.format("%d %b %Y %H:%M UTC")
    );
    println!(
        "- Visiting /my-tasks signed in -> {}",
        describe(resolve("/my-tasks", Some(&session), now))
    );
    let menu: Vec<&str> = navigation_for(session.user.role)
        .iter()
        .map(|item| item.label)
        .collect();
    println!("  Sidebar: {}", menu.join(" | "));

    let profile = data.fetch_user_profile()?.for_session_user(&session.user);
    let insights = KarmaInsights::derive(f64::from(profile.karma_score.score), &profile.activity);
    println!("\nProfile");
    println!(
        "- Karma score {} ({}) | loan limit ${}",
        profile.karma_score.score, insights.risk_label, insights.loan_limit
    );
    println!(
        "- {} tasks completed | ${} earned | {} day streak | {:.1} avg rating",
        profile.work_stats.total_tasks_completed,
        profile.work_stats.total_earnings_usd,
        profile.work_stats.active_streak,
        profile.work_stats.avg_rating
    );
    println!(
        "- Agent scores: work frequency {:.1} | task success {:.1} | repayment {:.1} | activity {:.1}",
        insights.agent_scores.work_frequency_agent,
        insights.agent_scores.task_success_rate_agent,
        insights.agent_scores.repayment_history_agent,
        insights.agent_scores.activity_agent
    );

    let tasks = data.fetch_tasks()?;
    println!();
    render_task_board(&TaskBoardView::build(&tasks, TaskFilter::All));

    let loans = LoanApplicationService::new(data.clone(), Arc::new(InMemoryLoanLedger::default()));
    let terms = loans.terms()?;
    println!("\nLoans");
    println!(
        "- Tier {} | limit {} | {} of {} active loans",
        terms.tier,
        format_amount(&terms.base_currency, terms.effective_limit()),
        terms.active_loans_count,
        terms.max_active_loans_allowed
    );

    let request = QuoteRequest {
        principal: args.principal,
        duration_days: args.duration,
        reputation_score: None,
    };
    let quote = match loans.quote(request, now) {
        Ok(quote) => quote,
        Err(err) => {
            println!("  Quote unavailable: {}", err);
            return Ok(());
        }
    };
    render_quote(&terms.base_currency, &quote);

    if let Err(blocked) = check_can_apply(&terms) {
        println!("  Apply blocked: {}", blocked);
        return Ok(());
    }

    match loans.submit(request, now) {
        Ok(receipt) => {
            println!(
                "- Application {} {} | repay {} by {}",
                receipt.application_id.0,
                receipt.status.label(),
                format_amount(&receipt.base_currency, receipt.quote.total_repayable),
                receipt.due_date_display
            );
            let stored = loans.get(&receipt.application_id)?;
            match serde_json::to_string_pretty(&stored) {
                Ok(json) => println!("  Receipt payload:\n{}", json),
                Err(err) => println!("  Receipt payload unavailable: {}", err),
            }
        }
        Err(err) => println!("  Application rejected: {}", err),
    }

    sessions.logout(&session.id.0)?;
    println!(
        "\n- Signed out; /loans -> {}",
        describe(resolve("/loans", None, now))
    );

    Ok(())
}

fn describe(decision: RouteDecision) -> String {
    match decision {
        RouteDecision::Render { route } => format!("render {}", route.path()),
        RouteDecision::Redirect { to, reason } => format!("redirect to {to} ({reason:?})"),
    }
}

fn render_quote(currency: &str, quote: &LoanQuote) {
    println!(
        "- Quote: {} for {} days at {}% / month ({} tier)",
        format_amount(currency, quote.principal),
        quote.duration_days,
        quote.interest_rate_monthly,
        quote.tier_label
    );
    println!(
        "  Interest {} | total repayable {} | due {}",
        format_amount(currency, quote.interest_amount),
        format_amount(currency, quote.total_repayable),
        format_due_date(quote.due_date)
    );
    if !quote.eligible {
        println!(
            "  Score {} is below the eligibility threshold; approval limit {}",
            quote.reputation_score,
            format_amount(currency, quote.max_approval_limit)
        );
    }
}

fn render_task_board(view: &TaskBoardView) {
    println!("{}", view.caption);
    if view.tasks.is_empty() {
        println!("  (no tasks)");
    }
    for task in &view.tasks {
        println!(
            "  - [{}] {} | {} | {} | {}% | ${:.0}{}",
            task.status.label(),
            task.title,
            task.platform,
            task.category,
            task.progress,
            task.payout_usd,
            task.due_date
                .map(|due| format!(" | due {}", due.format("%d %b %Y")))
                .unwrap_or_default()
        );
    }

    let summary = &view.summary;
    println!(
        "Summary: {} total | {} active | {} pending review | {} completed | {} rejected | {:.1} h logged",
        summary.total_tasks,
        summary.active_tasks,
        summary.pending_review,
        summary.completed_tasks,
        summary.rejected_tasks,
        summary.hours_logged
    );
    if let Some(rating) = summary.avg_task_rating {
        println!("  Average rating on completed work: {rating:.1}");
    }
    let workload: Vec<String> = view
        .workload
        .iter()
        .map(|entry| format!("{} {}%", entry.status_label, entry.percent))
        .collect();
    println!("Workload: {}", workload.join(" | "));
}
