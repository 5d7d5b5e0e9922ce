use clap::Parser;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use safari_cart::config::cli::{AddArgs, BookArgs, Command, SelectionArgs};
use safari_cart::domain::ports::ConfigProvider;
use safari_cart::utils::error::{ErrorSeverity, Result, SafariError};
use safari_cart::utils::{logger, validation::Validate};
use safari_cart::{
    BookingDraft, BookingForm, BookingSelection, CardDetails, Cart, CartEvent, CartStore, CliConfig,
    HttpBookingGateway, LocalStorage, PaymentMethod, PricingCalculator, Product, ProductId,
    TomlConfig,
};
use std::str::FromStr;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(command: &Command, config: &TomlConfig) -> Result<()> {
    let pricing = PricingCalculator::new(config.pricing().clone());

    match command {
        Command::Show => {
            let store = open_store(config);
            print_cart(&store, &pricing);
        }
        Command::Add(args) => {
            let product = product_from_args(args)?;
            let mut store = open_store(config);
            store.add_item(&product)?;
            println!(
                "✓ Added to cart: {} ({})",
                product.name,
                pricing.format_amount(product.price)
            );
            print_cart(&store, &pricing);
        }
        Command::Remove { id } => {
            let mut store = open_store(config);
            store.remove_item(&ProductId::parse(id))?;
            print_cart(&store, &pricing);
        }
        Command::SetQuantity { id, quantity } => {
            let mut store = open_store(config);
            store.update_quantity_from_input(&ProductId::parse(id), quantity)?;
            print_cart(&store, &pricing);
        }
        Command::Clear => {
            let mut store = open_store(config);
            store.clear()?;
            println!("Cart cleared");
        }
        Command::Services => {
            for service in config.catalog().services() {
                let unit = match service.pricing_mode {
                    safari_cart::PricingMode::PerPerson => "per person",
                    safari_cart::PricingMode::FlatPerBooking => "per booking",
                };
                println!(
                    "{:<20} {:<24} {} {}",
                    service.id,
                    service.name,
                    pricing.format_amount(service.price),
                    unit
                );
            }
        }
        Command::Quote(args) => {
            let selection = selection_from_args(config, args)?;
            let quote = pricing.booking_quote(&selection);
            println!("Subtotal:    {}", pricing.format_amount(quote.subtotal));
            println!("Service fee: {}", pricing.format_amount(quote.service_fee));
            println!("Total:       {}", pricing.format_amount(quote.total));
        }
        Command::Book(args) => {
            let draft = draft_from_args(config, args)?;
            let form = BookingForm::new(gateway(config)?, pricing);
            let request = form.build_request(&draft, Local::now().date_naive())?;
            let confirmation = form.send(&request).await?;
            let summary = request.services_summary(config.catalog());

            println!("✅ Booking request submitted");
            println!("Booking code: {}", confirmation.booking_code);
            println!("Services:     {}", summary);
            println!(
                "Total:        {}",
                form.pricing().format_amount(request.total_amount)
            );
            if let Some(message) = confirmation.message {
                println!("{}", message);
            }
        }
        Command::Status { booking_code } => {
            let form = BookingForm::new(gateway(config)?, pricing);
            let status = form.booking_status(booking_code).await?;
            let services = status
                .requested_services
                .iter()
                .map(|id| config.catalog().display_name(id))
                .collect::<Vec<_>>()
                .join(", ");

            println!("Booking code:   {}", status.booking_code);
            println!("Tourist:        {}", status.tourist_name);
            println!("Arrival:        {}", status.arrival_date);
            println!("Visitors:       {}", status.num_visitors);
            println!("Services:       {}", services);
            println!("Status:         {}", status.status);
            println!("Payment status: {}", status.payment_status);
            println!(
                "Total:          {}",
                form.pricing().format_amount(status.total_amount)
            );
            if let Some(confirmed) = status.confirmed_services {
                println!("Confirmed:      {}", confirmed.join(", "));
            }
        }
    }

    Ok(())
}

fn open_store(config: &TomlConfig) -> CartStore<LocalStorage> {
    let storage = LocalStorage::new(config.storage_path().to_string());
    let mut store = CartStore::with_key(storage, config.cart_key());
    store.subscribe(|event: &CartEvent, cart: &Cart| {
        tracing::info!(
            "🛒 {:?} ({} lines, {} items)",
            event,
            cart.len(),
            cart.item_count()
        );
    });
    store
}

fn gateway(config: &TomlConfig) -> Result<HttpBookingGateway> {
    HttpBookingGateway::new(
        config.api_base_url(),
        Duration::from_secs(config.request_timeout_seconds()),
    )
}

fn print_cart(store: &CartStore<LocalStorage>, pricing: &PricingCalculator) {
    let cart = store.cart();
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>3} x {:<30} [{}] {:>14}",
            item.quantity,
            item.name,
            item.id,
            pricing.format_amount(item.line_total())
        );
    }

    let summary = pricing.cart_summary(cart);
    println!(
        "Subtotal ({} items): {}",
        summary.item_count,
        pricing.format_amount(summary.subtotal)
    );
    println!("Shipping: {}", pricing.format_amount(summary.shipping));
    println!("Total: {}", pricing.format_amount(summary.total));
}

fn product_from_args(args: &AddArgs) -> Result<Product> {
    let price = Decimal::from_str(args.price.trim())
        .map_err(|_| SafariError::validation("price", "Price must be a number"))?;
    if price.is_sign_negative() {
        return Err(SafariError::validation("price", "Price cannot be negative"));
    }

    Ok(Product {
        id: ProductId::parse(&args.id),
        name: args.name.clone(),
        price,
        image: args.image.clone(),
        category: args.category.clone(),
    })
}

fn selection_from_args(config: &TomlConfig, args: &SelectionArgs) -> Result<BookingSelection> {
    let mut selection = config.catalog().select(&args.services, 0)?;
    selection.set_num_visitors_from_input(&args.visitors);
    Ok(selection)
}

fn draft_from_args(config: &TomlConfig, args: &BookArgs) -> Result<BookingDraft> {
    let arrival_date = NaiveDate::parse_from_str(args.arrival_date.trim(), "%Y-%m-%d")
        .map_err(|_| SafariError::validation("arrivalDate", "Use the YYYY-MM-DD format"))?;
    let payment_method = PaymentMethod::from_str(&args.payment)?;
    let card = (payment_method == PaymentMethod::Card).then(|| CardDetails {
        number: args.card_number.clone(),
        expiry: args.card_expiry.clone(),
        cvc: args.card_cvc.clone(),
        name: args.card_name.clone(),
    });

    Ok(BookingDraft {
        tourist_name: args.name.clone(),
        tourist_email: args.email.clone(),
        tourist_phone: args.phone.clone(),
        arrival_date,
        selection: selection_from_args(config, &args.selection)?,
        special_requests: args.special_requests.clone(),
        payment_method,
        card,
    })
}
