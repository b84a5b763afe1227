use crate::audio_toolkit::list_input_devices;
use crate::settings::get_settings;

pub fn run() -> anyhow::Result<()> {
    let settings = get_settings();
    let devices = list_input_devices()?;

    if devices.is_empty() {
        println!("No input devices found");
        return Ok(());
    }

    for device in devices {
        let selected = settings.selected_microphone.as_deref() == Some(device.name.as_str());
        println!("{} {}", if selected { "*" } else { " " }, device.name);
    }

    Ok(())
}
