use clap::{Args, Subcommand};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the cart with subtotal, shipping and total
    Show,

    /// Add one unit of a product to the cart
    Add(AddArgs),

    /// Remove a product line from the cart
    Remove {
        #[arg(long)]
        id: String,
    },

    /// Set a line's quantity; 0, negative or non-numeric removes it
    SetQuantity {
        #[arg(long)]
        id: String,
        #[arg(long, allow_hyphen_values = true)]
        quantity: String,
    },

    /// Empty the cart
    Clear,

    /// List bookable services from the configuration
    Services,

    /// Price a booking without submitting it
    Quote(SelectionArgs),

    /// Submit a booking to the order service
    Book(BookArgs),

    /// Look up a booking by its code
    Status { booking_code: String },
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub price: String,
    #[arg(long, default_value = "")]
    pub image: String,
    #[arg(long, default_value = "")]
    pub category: String,
}

#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Number of visitors; non-numeric input counts as 0
    #[arg(long, default_value = "1")]
    pub visitors: String,

    #[arg(long = "service", value_delimiter = ',')]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct BookArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,

    /// Arrival date as YYYY-MM-DD
    #[arg(long)]
    pub arrival_date: String,

    #[arg(long, default_value = "")]
    pub special_requests: String,

    /// mpesa, card or paypal
    #[arg(long, default_value = "mpesa")]
    pub payment: String,

    #[arg(long, default_value = "")]
    pub card_number: String,
    #[arg(long, default_value = "")]
    pub card_expiry: String,
    #[arg(long, default_value = "")]
    pub card_cvc: String,
    #[arg(long, default_value = "")]
    pub card_name: String,
}
