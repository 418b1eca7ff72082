use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use jptel_core::{normalize_japan_phone, PhoneCheck};
use tracing::debug;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    #[arg(allow_hyphen_values = true)]
    pub phone: String,
}

pub fn normalize(ctx: &Context<'_>, args: NormalizeArgs) -> Result<()> {
    let result = normalize_japan_phone(&args.phone);

    if ctx.json {
        print_json(&PhoneCheck::from(result.clone()))?;
    }

    match result {
        Ok(phone) => {
            if !ctx.json {
                println!("{}", phone);
            }
            Ok(())
        }
        Err(err) => {
            debug!(kind = err.kind(), "phone rejected");
            Err(err.into())
        }
    }
}
