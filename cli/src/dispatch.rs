//! Runs one parsed command against the engine.

use anyhow::{Result, bail};
use rally_application::{Caller, CreateActivityInput, Engine};
use rally_domain::{ActivityDetails, ActivityId, FinalizeRequest, OptionId, PlaceAttributes};
use rally_presentation::{Command, CommandOutput, FinalizeArgs, ProposePlaceArgs};

pub async fn run(engine: &Engine, caller: &Caller, command: Command) -> Result<CommandOutput> {
    let output = match command {
        Command::Register { .. } => bail!("register does not take --as or --guest-token"),

        Command::Create {
            kind,
            title,
            location,
            welcome,
        } => {
            let mut input = CreateActivityInput::new(kind, title);
            if let Some(location) = location {
                input = input.with_location(location);
            }
            if let Some(welcome) = welcome {
                input = input.with_welcome_message(welcome);
            }
            CommandOutput::Activity(engine.activities().create(caller, input).await?)
        }

        Command::Show { activity } => {
            CommandOutput::Activity(engine.activities().get(caller, &id(&activity)).await?)
        }

        Command::List => CommandOutput::Activities(engine.activities().list(caller).await?),

        Command::Update {
            activity,
            title,
            location,
            welcome,
        } => {
            let details = ActivityDetails {
                title,
                location,
                welcome_message: welcome,
            };
            if details.is_empty() {
                bail!("Nothing to update: pass --title, --location or --welcome");
            }
            CommandOutput::Activity(
                engine
                    .activities()
                    .update(caller, &id(&activity), details)
                    .await?,
            )
        }

        Command::Invite { activity, email } => CommandOutput::Invite(
            engine
                .participants()
                .invite(caller, &id(&activity), &email)
                .await?
                .into(),
        ),

        Command::Accept { activity } => {
            CommandOutput::Participant(engine.participants().accept(caller, &id(&activity)).await?)
        }

        Command::Decline { activity } => {
            engine.participants().decline(caller, &id(&activity)).await?;
            CommandOutput::done("Invitation declined")
        }

        Command::Leave { activity } => {
            engine.participants().leave(caller, &id(&activity)).await?;
            CommandOutput::done("Left the activity")
        }

        Command::Remove { activity, email } => CommandOutput::Participant(
            engine
                .participants()
                .remove(caller, &id(&activity), &email)
                .await?,
        ),

        Command::GuestToken { activity, email } => CommandOutput::GuestToken(
            engine
                .participants()
                .issue_guest_token(caller, &id(&activity), &email)
                .await?,
        ),

        Command::ProposePlace(ProposePlaceArgs {
            activity,
            name,
            address,
            rating,
            price_level,
            url,
        }) => {
            let place = PlaceAttributes {
                address,
                rating,
                price_level,
                url,
                ..PlaceAttributes::new(name)
            };
            CommandOutput::Proposal(
                engine
                    .options()
                    .propose_place(caller, &id(&activity), place)
                    .await?,
            )
        }

        Command::ProposeSlot {
            activity,
            date,
            time,
        } => CommandOutput::Proposal(
            engine
                .options()
                .propose_slot(caller, &id(&activity), &date, &time)
                .await?,
        ),

        Command::RemoveOption { activity, option } => CommandOutput::OptionRemoved(
            engine
                .options()
                .remove(caller, &id(&activity), &OptionId::new(option))
                .await?,
        ),

        Command::Vote {
            activity,
            option,
            on,
            off,
        } => {
            let options = engine.options();
            let (activity, option) = (id(&activity), OptionId::new(option));
            let outcome = if on {
                options.vote(caller, &activity, &option).await?
            } else if off {
                options.unvote(caller, &activity, &option).await?
            } else {
                options.toggle_vote(caller, &activity, &option).await?
            };
            CommandOutput::Vote(outcome)
        }

        Command::Availability { activity, payload } => CommandOutput::Availability(
            engine
                .meetings()
                .submit_availability(caller, &id(&activity), payload)
                .await?
                .into(),
        ),

        Command::Slots { activity } => CommandOutput::Slots(
            engine
                .meetings()
                .list_time_slots(caller, &id(&activity))
                .await?,
        ),

        Command::Recommend { activity } => CommandOutput::Options(
            engine
                .options()
                .seed_recommendations(caller, &id(&activity))
                .await?,
        ),

        Command::Finalize(FinalizeArgs {
            activity,
            option,
            at,
            location,
            welcome,
        }) => {
            let request = FinalizeRequest {
                selected_option: option.map(OptionId::new),
                scheduled_at: at,
                location,
                welcome_message: welcome,
            };
            CommandOutput::Finalized(
                engine
                    .finalization()
                    .finalize(caller, &id(&activity), request)
                    .await?,
            )
        }

        Command::Reschedule { activity, at } => CommandOutput::Rescheduled(
            engine
                .finalization()
                .reschedule(caller, &id(&activity), at)
                .await?,
        ),

        Command::Complete { activity } => CommandOutput::Completed(
            engine
                .finalization()
                .complete(caller, &id(&activity))
                .await?,
        ),

        Command::Destroy { activity } => {
            engine.activities().destroy(caller, &id(&activity)).await?;
            CommandOutput::done("Activity deleted")
        }
    };
    Ok(output)
}

fn id(raw: &str) -> ActivityId {
    ActivityId::new(raw.trim())
}
