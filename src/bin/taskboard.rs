use structopt::StructOpt;

use tasktracker::model::TaskPriority;
use tasktracker::{NewTask, TaskBoard, TaskClient};

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Show pending and completed tasks.
    List,
    /// Add a new pending task.
    Add {
        /// The task title.
        #[structopt()]
        title: String,

        /// Optional longer description.
        #[structopt(short, long)]
        description: Option<String>,

        /// High, Medium or Low.
        #[structopt(short, long)]
        priority: Option<TaskPriority>,
    },
    /// Mark a task as completed.
    Complete {
        #[structopt()]
        id: String,
    },
    /// Delete a task for good.
    Delete {
        #[structopt()]
        id: String,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(name = "taskboard", about = "Terminal board for the task tracker.")]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Command,

    /// Base url of the task tracker backend.
    #[structopt(
        short,
        long,
        env = "TASKTRACKER_URL",
        default_value = "http://localhost:5000"
    )]
    pub url: String,
}

#[tokio::main]
async fn main() {
    let CommandLineArgs { action, url } = CommandLineArgs::from_args();

    let mut board = TaskBoard::new(TaskClient::new(&url));
    board.load().await;
    if board.error().is_none() {
        match action {
            Command::List => {}
            Command::Add {
                title,
                description,
                priority,
            } => {
                board
                    .add(NewTask::new(&title, description.as_deref(), priority))
                    .await
            }
            Command::Complete { id } => board.complete(&id).await,
            Command::Delete { id } => board.delete(&id).await,
        }
    }

    print!("{}", board);
    if board.error().is_some() {
        std::process::exit(1);
    }
}
