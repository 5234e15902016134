use clap::{Parser, Subcommand};
use anyhow::{Result, anyhow};
use tracing::{error, info, warn};

mod app;
mod handler;
mod logging;
mod player;
mod tui;
mod ui;

use app::{App, Preferences};
use ayah_core::{
    Config, FilePreferences, MemoryPreferences, NullMedia, RenderPresenter, Variant,
    VerseFetcher, VerseRequest, VerseSession, VerseView,
};

#[derive(Parser)]
#[command(name = "ayah")]
#[command(about = "Show a random Quran verse with translations and recitation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Page flavour: basic, translations, or recitation
    #[arg(long, global = true, value_parser = parse_variant)]
    variant: Option<Variant>,
    /// Base URL of the ayah endpoint
    #[arg(long, global = true)]
    api_base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal view (default)
    Tui,
    /// Print one verse and exit
    Show {
        /// Global verse number (1-6236); random when omitted
        #[arg(short, long)]
        verse: Option<u32>,
    },
}

fn parse_variant(s: &str) -> Result<Variant, String> {
    Variant::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Variant::all().iter().map(|v| v.as_str()).collect();
        format!("unknown variant '{}', expected one of: {}", s, names.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::new(), Some(e)),
    };

    let variant = cli.variant.unwrap_or_else(|| config.variant());
    let api_base = cli.api_base.clone().unwrap_or_else(|| config.api_base());
    let fetcher = VerseFetcher::new(&api_base, variant);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Show { verse } => {
            logging::init_stderr("warn");
            if let Some(e) = config_error {
                warn!("Ignoring unreadable config: {:#}", e);
            }
            show_verse(&fetcher, verse).await
        }
        Commands::Tui => {
            let log_path = logging::init_file(config.log_level())?;
            if let Some(e) = config_error {
                warn!("Ignoring unreadable config: {:#}", e);
            }
            info!(log = %log_path.display(), "Starting ayah");
            run_tui(fetcher).await
        }
    }
}

async fn run_tui(fetcher: VerseFetcher) -> Result<()> {
    let preferences = match FilePreferences::default_path() {
        Ok(path) => Preferences::File(FilePreferences::open(path)),
        Err(e) => {
            warn!("Theme will not persist: {:#}", e);
            Preferences::Memory(MemoryPreferences::default())
        }
    };

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(fetcher, preferences, events.sender());

    // First verse on launch
    app.request_verse();

    let result = run_loop(&mut terminal, &mut events, &mut app).await;
    tui::restore()?;

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    events: &mut tui::EventHandler,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

async fn show_verse(fetcher: &VerseFetcher, verse: Option<u32>) -> Result<()> {
    let request = match verse {
        Some(number) => VerseRequest::new(number, fetcher.variant())
            .ok_or_else(|| anyhow!("Verse number must be between 1 and {}", ayah_core::TOTAL_VERSES))?,
        None => VerseRequest::pick(fetcher.variant()),
    };

    let mut session: VerseSession<NullMedia> =
        VerseSession::new(RenderPresenter::new(fetcher.variant()), None);
    let ticket = session.begin_fetch();
    let outcome = fetcher.fetch_verse(&request).await;
    let audio = outcome
        .as_ref()
        .ok()
        .and_then(|v| v.audio_url().map(str::to_string));
    let failed = outcome.is_err();
    session.complete(ticket, outcome);

    print!("{}", format_view(session.view(), audio.as_deref()));

    if failed {
        return Err(anyhow!("Could not load verse {}", request.number()));
    }
    Ok(())
}

/// Plain-text rendering of the verse regions for `show`.
fn format_view(view: &VerseView, audio: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&view.arabic.text);
    out.push('\n');
    for translation in &view.translations {
        out.push('\n');
        out.push_str(&translation.region.text);
        out.push('\n');
    }
    if !view.reference.text.is_empty() {
        out.push_str(&format!("\n  {}\n", view.reference.text));
    }
    if let Some(url) = audio {
        out.push_str(&format!("♪ {}\n", url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ayah_core::parse_response;

    #[test]
    fn test_format_view_lists_regions_in_order() {
        let body = r#"{"code":200,"data":[
            {"edition":{"identifier":"quran-uthmani"},"text":"بسم الله","surah":{"englishName":"Al-Fatihah","number":1},"numberInSurah":1},
            {"edition":{"identifier":"en.sahih"},"text":"In the name of Allah","surah":{"englishName":"Al-Fatihah","number":1},"numberInSurah":1}
        ]}"#;
        let verse = parse_response(Variant::Translations, body).unwrap();
        let mut presenter = RenderPresenter::new(Variant::Translations);
        presenter.render::<NullMedia>(&verse, None);

        let text = format_view(presenter.view(), None);
        assert_eq!(
            text,
            "بسم الله\n\nIn the name of Allah\n\n[বাংলা অনুবাদ নেই]\n\n  Al-Fatihah • 1\n"
        );
    }

    #[test]
    fn test_format_view_after_failure_has_no_reference() {
        let mut presenter = RenderPresenter::new(Variant::Basic);
        presenter.render_failure();
        assert_eq!(format_view(presenter.view(), None), "تعذر تحميل الآية.\n");
    }

    #[test]
    fn test_parse_variant_rejects_unknown() {
        assert_eq!(parse_variant("translations"), Ok(Variant::Translations));
        assert!(parse_variant("video").unwrap_err().contains("recitation"));
    }
}
