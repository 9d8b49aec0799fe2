use crate::config::VerticalConfig;
use crate::domain::booking::BookingDraft;
use crate::domain::ports::CustomerIdentity;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "servicebook")]
#[command(about = "Browse, compare and book home services")]
pub struct CliConfig {
    /// Built-in vertical to use (construction, home-services)
    #[arg(long, global = true, default_value = "construction")]
    pub vertical: String,

    /// Path to a vertical TOML configuration (overrides --vertical)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the API base URL from the configuration
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List catalog services
    List {
        #[arg(long, default_value = "All")]
        category: String,
    },
    /// Show one service
    Show { id: String },
    /// Compare two or three services side by side (CSV on stdout)
    Compare {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },
    /// Submit a booking request
    Book(BookArgs),
    /// Look up a booking by id and phone
    Track {
        #[arg(long)]
        booking_id: String,
        #[arg(long)]
        phone: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct BookArgs {
    #[arg(long)]
    pub service: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, default_value = "")]
    pub street: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub state: String,
    #[arg(long, default_value = "")]
    pub pincode: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub date: String,
    /// HH:MM-HH:MM
    #[arg(long, default_value = "")]
    pub slot: String,
    /// Requirement field, e.g. --detail budget="5-10 Lakhs"
    #[arg(long = "detail", value_parser = parse_key_val)]
    pub details: Vec<(String, String)>,
}

fn parse_key_val(value: &str) -> std::result::Result<(String, String), String> {
    let (key, val) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", value))?;
    Ok((key.trim().to_string(), val.to_string()))
}

impl CliConfig {
    /// 依參數載入垂直領域設定並套用覆蓋值
    pub fn load_vertical(&self) -> Result<VerticalConfig> {
        let mut config = match &self.config {
            Some(path) => VerticalConfig::from_file(path)?,
            None => VerticalConfig::preset(&self.vertical)?,
        };
        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        Ok(config)
    }
}

impl BookArgs {
    /// 命令列提供的姓名視為已登入身分
    pub fn identity(&self) -> Option<CustomerIdentity> {
        self.name.as_ref().map(|name| CustomerIdentity {
            name: name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        })
    }

    /// Copies the remaining flags into a draft, keeping prefilled identity
    /// fields when a flag is absent.
    pub fn apply_to(&self, draft: &mut BookingDraft) {
        if let Some(phone) = &self.phone {
            draft.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            draft.email = email.clone();
        }
        draft.street = self.street.clone();
        draft.city = self.city.clone();
        draft.state = self.state.clone();
        draft.pincode = self.pincode.clone();
        draft.date = self.date.clone();
        draft.time_slot = self.slot.clone();
        for (key, value) in &self.details {
            draft.set_requirement(key.clone(), value.clone());
        }
    }
}
