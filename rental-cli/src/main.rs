//! Rental CLI
//!
//! Command-line interface for the car rental API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use rental_client::RentalClient;
use rental_types::{AttachCardRequest, CarId, CarQuery, CarSort, RegisterUserRequest, SortDirection};

#[derive(Parser)]
#[command(name = "rental")]
#[command(author, version, about = "Car rental API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the rental API
    #[arg(long, env = "RENTAL_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Session token from `rental login`
    #[arg(long, env = "RENTAL_API_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Register a new user
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: String,
    },
    /// Log in and print a session token
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// List packages
    Packages,
    /// List cars
    Cars {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        /// id, brand, model or package
        #[arg(long, default_value = "id")]
        sort: String,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        direction: String,
        #[arg(long)]
        available: Option<bool>,
        #[arg(long)]
        package: Option<String>,
    },
    /// Show a single car
    Car { id: String },
    /// Credit card operations
    Card {
        #[command(subcommand)]
        action: CardCommands,
    },
    /// Pay for a package and reserve it
    Order {
        package: String,
        #[arg(long)]
        hours: i32,
    },
    /// Show the active reservation
    Reservation,
    /// Pick up a car with the active reservation
    Pickup { car_id: String },
    /// Rental history
    Rentals,
}

#[derive(Subcommand)]
enum CardCommands {
    /// Attach a credit card
    Attach {
        number: String,
        #[arg(long)]
        expiry_month: i32,
        #[arg(long)]
        expiry_year: i32,
        #[arg(long)]
        cvv: String,
    },
    /// Show the attached card
    Show,
    /// Add funds (minor units)
    TopUp { amount: i64 },
    /// Remove the attached card
    Remove,
}

fn parse_sort(s: &str) -> Result<CarSort> {
    match s.to_lowercase().as_str() {
        "id" => Ok(CarSort::Id),
        "brand" => Ok(CarSort::Brand),
        "model" => Ok(CarSort::Model),
        "package" => Ok(CarSort::Package),
        _ => anyhow::bail!("Unknown sort column: {}. Supported: id, brand, model, package", s),
    }
}

fn parse_direction(s: &str) -> Result<SortDirection> {
    match s.to_lowercase().as_str() {
        "asc" => Ok(SortDirection::Asc),
        "desc" => Ok(SortDirection::Desc),
        _ => anyhow::bail!("Unknown direction: {}. Supported: asc, desc", s),
    }
}

fn parse_car_id(s: &str) -> Result<CarId> {
    s.parse().map_err(|_| anyhow::anyhow!("Invalid car ID: {}", s))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = RentalClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Register {
            username,
            email,
            password,
            phone,
        } => {
            let user = client
                .register(&RegisterUserRequest {
                    username,
                    email,
                    password,
                    phone,
                })
                .await?;
            print_json(&user)?;
        }

        Commands::Login { username, password } => {
            let session = client.login(&username, &password).await?;
            println!("{}", session.token);
        }

        Commands::Logout => {
            client.logout().await?;
            println!("✓ Logged out");
        }

        Commands::Packages => print_json(&client.list_packages().await?)?,

        Commands::Cars {
            page,
            size,
            sort,
            direction,
            available,
            package,
        } => {
            let query = CarQuery {
                page,
                size,
                sort: parse_sort(&sort)?,
                direction: parse_direction(&direction)?,
                available,
                package,
            };
            print_json(&client.list_cars(&query).await?)?;
        }

        Commands::Car { id } => print_json(&client.get_car(parse_car_id(&id)?).await?)?,

        Commands::Card { action } => match action {
            CardCommands::Attach {
                number,
                expiry_month,
                expiry_year,
                cvv,
            } => {
                let card = client
                    .attach_card(&AttachCardRequest {
                        number,
                        expiry_month,
                        expiry_year,
                        cvv,
                    })
                    .await?;
                print_json(&card)?;
            }
            CardCommands::Show => print_json(&client.get_card().await?)?,
            CardCommands::TopUp { amount } => print_json(&client.add_funds(amount).await?)?,
            CardCommands::Remove => {
                client.remove_card().await?;
                println!("✓ Card removed");
            }
        },

        Commands::Order { package, hours } => {
            print_json(&client.submit_order(&package, hours).await?)?
        }

        Commands::Reservation => print_json(&client.reservation().await?)?,

        Commands::Pickup { car_id } => {
            print_json(&client.pick_up(parse_car_id(&car_id)?).await?)?
        }

        Commands::Rentals => print_json(&client.list_rentals().await?)?,
    }

    Ok(())
}
