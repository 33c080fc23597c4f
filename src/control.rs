use std::str::FromStr;

use crate::error::SlidesError;
use crate::events::WidgetEvent;

/// One line of the text control stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(WidgetEvent),
    Quit,
}

impl FromStr for Command {
    type Err = SlidesError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(SlidesError::UnknownCommand(line.to_string()));
        };
        let event = match verb.to_ascii_lowercase().as_str() {
            "next" | "right" | "n" => WidgetEvent::NextClicked,
            "prev" | "left" | "p" => WidgetEvent::PrevClicked,
            "play" => WidgetEvent::PlayClicked,
            "pause" => WidgetEvent::PauseClicked,
            "toggle" | "t" => WidgetEvent::PlayPauseToggled,
            "status" | "s" => WidgetEvent::Status,
            "quit" | "exit" | "q" => return Ok(Command::Quit),
            "bullet" | "b" => {
                let bullet = words
                    .next()
                    .and_then(|word| word.parse::<usize>().ok())
                    .ok_or_else(|| SlidesError::UnknownCommand(line.to_string()))?;
                WidgetEvent::BulletClicked(bullet)
            }
            "set" => {
                let (Some(key), Some(value)) = (words.next(), words.next()) else {
                    return Err(SlidesError::UnknownCommand(line.to_string()));
                };
                WidgetEvent::SettingAssigned {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            _ => return Err(SlidesError::UnknownCommand(line.to_string())),
        };
        if words.next().is_some() {
            return Err(SlidesError::UnknownCommand(line.to_string()));
        }
        Ok(Command::Event(event))
    }
}
