//! The smallest end-to-end scenario: create an assistant, start a thread,
//! post a user question, run the assistant over the thread and print its
//! answer once the run completes.
//!
//! Needs `OPENAI_API_KEY` in the environment or a `.env` file.

use openai_assistants::assistants::messages::{MessageRequest, Role};
use openai_assistants::assistants::runs::RunRequest;
use openai_assistants::assistants::threads::ThreadRequest;
use openai_assistants::assistants::{AssistantRequest, RunDriver};
use openai_assistants::{Client, Credentials, ListQuery};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let client = Client::new(Credentials::from_env()?)?;

    let assistant = client
        .create_assistant(
            &AssistantRequest::builder("gpt-4-1106-preview")
                .instructions("You are an expert in geography, be helpful and concise.")
                .build()?,
        )
        .await?;
    println!("assistant: {}", assistant.id);

    // A thread represents one session between a user and the application.
    let thread = client.create_thread(&ThreadRequest::default()).await?;
    client
        .create_message(
            &thread.id,
            &MessageRequest::new(Role::User, "What is the capital of France?"),
        )
        .await?;

    // The run executes asynchronously on the server; the driver polls it to
    // a terminal state.
    let driver = RunDriver::new(&client);
    let run = driver
        .run(&thread.id, &RunRequest::new(&assistant.id))
        .await?;
    println!("run {} finished with status {:?}", run.id, run.status);

    // The thread now holds both the user's and the assistant's messages;
    // keep only the assistant's.
    let messages = client.list_messages(&thread.id, &ListQuery::default()).await?;
    for message in messages.data.iter().filter(|m| m.role == Role::Assistant) {
        println!("assistant says: {}", message.text());
    }

    client.delete_thread(&thread.id).await?;
    client.delete_assistant(&assistant.id).await?;
    Ok(())
}
