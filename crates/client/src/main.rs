//! `vitegourmand-order`: terminal front end for the order workflow.
//!
//! ```text
//! vitegourmand-order order            walk the order wizard (resumes a parked order)
//! vitegourmand-order brief            compose a custom-menu brief with the assistant
//! vitegourmand-order session <token>  store the token obtained from the login page
//! vitegourmand-order logout           forget the stored token
//! ```

use anyhow::{bail, Context};
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitegourmand_client::api::ApiClient;
use vitegourmand_client::composer::{BriefComposer, ContactDetails};
use vitegourmand_client::config::ClientConfig;
use vitegourmand_client::pending_store::FileDraftStore;
use vitegourmand_client::session::FileSessionStore;
use vitegourmand_core::brief::BriefField;
use vitegourmand_core::menu::{Menu, MenuFilter};
use vitegourmand_core::order_draft::{DraftAction, MenuChoice};
use vitegourmand_core::order_flow::{NoticeLevel, OrderFlow, Step};
use vitegourmand_core::pricing::ESTIMATE_DISCLAIMER;
use vitegourmand_core::submission::{SubmissionGate, SubmitError};

/// Page size used when fetching the catalog for the wizard.
const CATALOG_PAGE_SIZE: u32 = 50;

type Gate = SubmissionGate<ApiClient, FileSessionStore, FileDraftStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitegourmand_client=info,vitegourmand_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = ClientConfig::from_env();
    tracing::debug!(api = %config.api_base_url, "Loaded client configuration");

    let api = ApiClient::new(config.api_base_url.clone());
    let sessions = FileSessionStore::new(config.session_file.clone())
        .with_override(config.session_token.clone());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("order") | None => {
            let gate = SubmissionGate::new(
                api,
                sessions,
                FileDraftStore::new(config.pending_order_file.clone()),
                config.auth_redirect(),
            );
            run_order(&gate).await
        }
        Some("brief") => run_brief(BriefComposer::new(api)).await,
        Some("session") => {
            let token = args.get(1).context("usage: vitegourmand-order session <token>")?;
            sessions.save(token)?;
            println!("Session enregistrée.");
            Ok(())
        }
        Some("logout") => {
            sessions.clear()?;
            println!("Session supprimée.");
            Ok(())
        }
        Some(other) => bail!("unknown command '{other}' (expected order, brief, session, logout)"),
    }
}

// ---------------------------------------------------------------------------
// Prompting
// ---------------------------------------------------------------------------

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` and read one trimmed line. `None` on end of input.
    async fn ask(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{label} ").as_bytes()).await?;
        stdout.flush().await?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }
}

fn print_notice(flow: &mut OrderFlow) {
    if let Some(notice) = flow.notice() {
        let prefix = match notice.level {
            NoticeLevel::Info => "ℹ",
            NoticeLevel::Error => "✗",
        };
        println!("{prefix} {}", notice.message);
    }
    flow.dismiss_notice();
}

// ---------------------------------------------------------------------------
// Order wizard
// ---------------------------------------------------------------------------

async fn run_order(gate: &Gate) -> anyhow::Result<()> {
    // A parked order is only resumed against the full catalog, so a failed
    // fetch stops here and leaves it parked.
    let catalog = gate
        .backend()
        .all_menus(&MenuFilter {
            limit: Some(CATALOG_PAGE_SIZE),
            ..Default::default()
        })
        .await
        .context("menu catalog unavailable, please retry later")?;

    let mut flow = match gate.resume(&catalog)? {
        Some(flow) => {
            println!("Reprise de votre commande en cours.");
            flow
        }
        None => OrderFlow::new(),
    };
    print_notice(&mut flow);

    let mut prompt = Prompt::new();
    loop {
        println!("\n== Étape {} : {} ==", flow.step().to_number(), flow.step().label());
        let keep_going = match flow.step() {
            Step::MenuSelection => menu_step(&mut flow, &catalog, &mut prompt).await?,
            Step::Delivery => delivery_step(&mut flow, &mut prompt).await?,
            Step::Details => details_step(&mut flow, &mut prompt).await?,
            Step::Recap => match recap_step(&mut flow, gate, &mut prompt).await? {
                RecapOutcome::Continue => true,
                RecapOutcome::Done => return Ok(()),
            },
        };
        if !keep_going {
            println!("À bientôt !");
            return Ok(());
        }
        print_notice(&mut flow);
    }
}

/// Move forward, printing the guard failure if any.
fn advance(flow: &mut OrderFlow) {
    if let Err(e) = flow.advance() {
        println!("✗ {e}");
    }
}

async fn menu_step(flow: &mut OrderFlow, catalog: &[Menu], prompt: &mut Prompt) -> anyhow::Result<bool> {
    for (i, menu) in catalog.iter().enumerate() {
        let stock = if menu.is_available() { "" } else { " (épuisé)" };
        println!(
            "  {}. {} - {:.2} €/pers., min. {} pers.{stock}",
            i + 1,
            menu.title,
            menu.price_per_person,
            menu.min_persons
        );
    }
    println!("  c. Menu sur mesure");

    let Some(choice) = prompt.ask("Votre choix :").await? else {
        return Ok(false);
    };

    if choice.eq_ignore_ascii_case("c") {
        let current = flow.draft().custom_description().unwrap_or_default().to_string();
        let Some(description) = prompt.ask("Décrivez votre demande :").await? else {
            return Ok(false);
        };
        let description = if description.is_empty() { current } else { description };
        flow.dispatch(DraftAction::SetCustomDescription(description))?;
    } else if let Some(menu) = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| catalog.get(i))
    {
        if let Err(e) = flow.dispatch(DraftAction::SelectMenu(menu.clone())) {
            println!("✗ {e}");
            return Ok(true);
        }
    } else if choice.is_empty() && flow.can_advance() {
        // Keep the current choice.
    } else {
        println!("✗ Choix invalide");
        return Ok(true);
    }

    advance(flow);
    Ok(true)
}

async fn delivery_step(flow: &mut OrderFlow, prompt: &mut Prompt) -> anyhow::Result<bool> {
    let current = flow.draft().delivery.clone();

    let Some(address) = prompt.ask(&format!("Adresse [{}] :", current.address)).await? else {
        return Ok(false);
    };
    let Some(city) = prompt.ask(&format!("Ville [{}] :", current.city)).await? else {
        return Ok(false);
    };
    let shown_date = current.date.map(|d| d.to_string()).unwrap_or_default();
    let Some(date) = prompt.ask(&format!("Date AAAA-MM-JJ [{shown_date}] :")).await? else {
        return Ok(false);
    };
    let Some(hour) = prompt.ask(&format!("Heure HH:MM [{}] :", current.hour)).await? else {
        return Ok(false);
    };

    if !address.is_empty() {
        flow.dispatch(DraftAction::SetAddress(address))?;
    }
    if !city.is_empty() {
        flow.dispatch(DraftAction::SetCity(city))?;
    }
    if !date.is_empty() {
        match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            Ok(parsed) => flow.dispatch(DraftAction::SetDate(Some(parsed)))?,
            Err(_) => println!("✗ Date invalide : {date}"),
        }
    }
    if !hour.is_empty() {
        flow.dispatch(DraftAction::SetHour(hour))?;
    }

    if let Some(back) = prompt_back(flow, prompt).await? {
        return Ok(back);
    }
    advance(flow);
    Ok(true)
}

async fn details_step(flow: &mut OrderFlow, prompt: &mut Prompt) -> anyhow::Result<bool> {
    let draft = flow.draft();
    println!("  Convives : {} (minimum {})", draft.person_count, draft.min_persons());
    if let Some(estimate) = draft.estimate() {
        println!("  Estimation : {} € ({ESTIMATE_DISCLAIMER})", estimate.display_total());
    }

    let Some(count) = prompt.ask("Nombre de convives (+, - ou un nombre) :").await? else {
        return Ok(false);
    };
    match count.as_str() {
        "" => {}
        "+" => flow.dispatch(DraftAction::IncrementPersons)?,
        "-" => {
            if !flow.draft().can_decrement() {
                println!("✗ Minimum atteint");
            }
            flow.dispatch(DraftAction::DecrementPersons)?;
        }
        n => match n.parse::<u32>() {
            Ok(n) => flow.dispatch(DraftAction::SetPersonCount(n))?,
            Err(_) => println!("✗ Nombre invalide : {n}"),
        },
    }

    let Some(instructions) = prompt.ask("Instructions particulières (facultatif) :").await? else {
        return Ok(false);
    };
    if !instructions.is_empty() {
        flow.dispatch(DraftAction::SetInstructions(instructions))?;
    }

    if let Some(back) = prompt_back(flow, prompt).await? {
        return Ok(back);
    }
    advance(flow);
    Ok(true)
}

/// Offer to continue or go back. `Some(keep_going)` when the customer went
/// back or quit, `None` to continue forward.
async fn prompt_back(flow: &mut OrderFlow, prompt: &mut Prompt) -> anyhow::Result<Option<bool>> {
    let Some(answer) = prompt.ask("[Entrée] continuer, [r] retour :").await? else {
        return Ok(Some(false));
    };
    if answer.eq_ignore_ascii_case("r") {
        let previous = Step::from_number(flow.step().to_number().saturating_sub(1).max(1))?;
        flow.back_to(previous)?;
        return Ok(Some(true));
    }
    Ok(None)
}

enum RecapOutcome {
    Continue,
    Done,
}

fn print_recap(flow: &OrderFlow) {
    let draft = flow.draft();
    match &draft.choice {
        MenuChoice::Catalog(menu) => println!("  Menu : {}", menu.title),
        MenuChoice::Custom { description } => println!("  Sur mesure : {description}"),
        MenuChoice::Unselected => println!("  Aucun menu"),
    }
    println!("  Livraison : {}", draft.delivery.full_address());
    if let Some(date) = draft.delivery.date {
        println!("  Le {} à {}", date.format("%d/%m/%Y"), draft.delivery.hour);
    }
    println!("  Convives : {}", draft.person_count);
    if !draft.instructions.trim().is_empty() {
        println!("  Instructions : {}", draft.instructions.trim());
    }
    if let Some(estimate) = draft.estimate() {
        println!("  Total estimé : {} € ({ESTIMATE_DISCLAIMER})", estimate.display_total());
    }
}

async fn recap_step(flow: &mut OrderFlow, gate: &Gate, prompt: &mut Prompt) -> anyhow::Result<RecapOutcome> {
    print_recap(flow);

    let Some(answer) = prompt.ask("[v] valider, [r] retour, [q] quitter :").await? else {
        return Ok(RecapOutcome::Done);
    };
    match answer.to_lowercase().as_str() {
        "v" => {}
        "r" => {
            flow.back_to(Step::Details)?;
            return Ok(RecapOutcome::Continue);
        }
        "q" => return Ok(RecapOutcome::Done),
        _ => return Ok(RecapOutcome::Continue),
    }

    match gate.submit(flow).await {
        Ok(reference) => {
            print_notice(flow);
            println!("Référence : {reference}");
            Ok(RecapOutcome::Done)
        }
        Err(SubmitError::Unauthenticated { redirect_to }) => {
            print_notice(flow);
            println!("Connectez-vous sur {redirect_to}, puis enregistrez votre jeton avec");
            println!("`vitegourmand-order session <jeton>` et relancez `vitegourmand-order order`.");
            Ok(RecapOutcome::Done)
        }
        Err(_) => {
            // The notice carries the message; the draft is intact for a retry.
            Ok(RecapOutcome::Continue)
        }
    }
}

// ---------------------------------------------------------------------------
// Brief composer
// ---------------------------------------------------------------------------

async fn run_brief(mut composer: BriefComposer) -> anyhow::Result<()> {
    println!("Décrivez votre événement à notre assistant.");
    println!("Commandes : /brief, /set <champ> <valeur>, /envoyer, /quitter");

    let mut prompt = Prompt::new();
    while let Some(line) = prompt.ask("vous >").await? {
        match line.as_str() {
            "" => continue,
            "/quitter" => break,
            "/brief" => println!("{}", composer.brief().to_ticket_description()),
            "/envoyer" => {
                let Some(contact) = ask_contact(&mut prompt).await? else {
                    break;
                };
                match composer.submit(&contact).await {
                    Ok(reference) => {
                        println!("Merci ! Votre {reference} est enregistrée.");
                        break;
                    }
                    Err(e) => println!("✗ {e}"),
                }
            }
            cmd if cmd.starts_with("/set ") => {
                let mut parts = cmd["/set ".len()..].splitn(2, ' ');
                let field = parts.next().unwrap_or_default();
                let value = parts.next().unwrap_or_default();
                match serde_json::from_value::<BriefField>(serde_json::Value::String(field.to_string())) {
                    Ok(field) => composer.edit(field, value),
                    Err(_) => println!("✗ Champ inconnu : {field}"),
                }
            }
            message => match composer.send(message).await {
                Ok(reply) => println!("assistant > {reply}"),
                Err(e) => println!("✗ {e}"),
            },
        }
    }
    Ok(())
}

async fn ask_contact(prompt: &mut Prompt) -> anyhow::Result<Option<ContactDetails>> {
    let Some(name) = prompt.ask("Nom :").await? else {
        return Ok(None);
    };
    let Some(email) = prompt.ask("Email :").await? else {
        return Ok(None);
    };
    let Some(phone) = prompt.ask("Téléphone (facultatif) :").await? else {
        return Ok(None);
    };
    Ok(Some(ContactDetails {
        name,
        email,
        phone: (!phone.is_empty()).then_some(phone),
    }))
}
