//! Tool-call resumption end to end: an assistant declares two callable
//! functions, the run pauses on `requires_action`, and the driver resolves
//! both calls through locally registered handlers before resuming.
//!
//! Needs `OPENAI_API_KEY` in the environment or a `.env` file.

use openai_assistants::assistants::messages::{MessageRequest, Role};
use openai_assistants::assistants::runs::RunRequest;
use openai_assistants::assistants::threads::ThreadRequest;
use openai_assistants::assistants::{AssistantRequest, RunDriver, Tool, ToolRegistry};
use openai_assistants::{Client, Credentials, ListQuery};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
    lat: f64,
    lon: f64,
    unit: String,
}

#[derive(Debug, Deserialize)]
struct CityArgs {
    city: String,
    country: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let client = Client::new(Credentials::from_env()?)?;

    // Declare the callable functions; the schemas shape the arguments the
    // model will produce.
    let assistant = client
        .create_assistant(
            &AssistantRequest::builder("gpt-4-1106-preview")
                .name("Weather and city names assistant")
                .instructions(
                    "You are a weather bot. Use the provided functions to answer questions.",
                )
                .tools(vec![
                    Tool::function(
                        "getCurrentWeather",
                        "Get the weather in location",
                        json!({
                            "type": "object",
                            "properties": {
                                "location": {
                                    "type": "string",
                                    "description": "The city and state e.g. San Francisco, CA"
                                },
                                "lat": { "type": "number", "description": "The city latitude" },
                                "lon": { "type": "number", "description": "The city longitude" },
                                "unit": { "type": "string", "enum": ["c", "f"] }
                            },
                            "required": ["location", "lat", "lon", "unit"]
                        }),
                    ),
                    Tool::function(
                        "getCityLocalNames",
                        "Get the local names of a city",
                        json!({
                            "type": "object",
                            "properties": {
                                "city": {
                                    "type": "string",
                                    "description": "The city e.g. San Francisco"
                                },
                                "country": {
                                    "type": "string",
                                    "description": "The country code e.g. NL"
                                }
                            },
                            "required": ["city", "country"]
                        }),
                    ),
                ])
                .build()?,
        )
        .await?;

    let thread = client.create_thread(&ThreadRequest::default()).await?;
    client
        .create_message(
            &thread.id,
            &MessageRequest::new(
                Role::User,
                "What is the weather in Amsterdam, Netherlands, \
                 and the known local names for this place?",
            ),
        )
        .await?;

    // Stand-ins for real weather/geocoding services.
    let tools = ToolRegistry::new()
        .register("getCurrentWeather", |args: WeatherArgs| async move {
            println!("getCurrentWeather({args:?})");
            let temp = if args.unit == "f" { 64.4 } else { 18.0 };
            Ok(format!("{temp}{} in {} ({}, {})", args.unit, args.location, args.lat, args.lon))
        })
        .register("getCityLocalNames", |args: CityArgs| async move {
            println!("getCityLocalNames({args:?})");
            Ok(format!("{} ({}): Amsterdam, Amsterdão, Ámsterdam", args.city, args.country))
        });

    let driver = RunDriver::new(&client).with_tools(tools);
    let run = driver
        .run(&thread.id, &RunRequest::new(&assistant.id))
        .await?;
    println!("run {} finished with status {:?}", run.id, run.status);

    let messages = client.list_messages(&thread.id, &ListQuery::default()).await?;
    for message in messages.data.iter().filter(|m| m.role == Role::Assistant) {
        println!("assistant says: {}", message.text());
    }

    client.delete_thread(&thread.id).await?;
    client.delete_assistant(&assistant.id).await?;
    Ok(())
}
