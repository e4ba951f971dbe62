//! Ready-made host environments for tests.
//!
//! Each scenario pairs a [`MockFs`] with a [`MockRunner`] describing one
//! kind of machine the dashboard runs on.

use super::filesystem::MockFs;
use super::runner::MockRunner;
use crate::collector::host::Host;

/// A mock filesystem and command script describing one host.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub fs: MockFs,
    pub runner: MockRunner,
}

impl Scenario {
    /// Host handle over clones of this scenario's filesystem and runner.
    ///
    /// The runner clone shares call counters with `self.runner`.
    pub fn host(&self) -> Host<MockFs, MockRunner> {
        Host::new(self.fs.clone(), self.runner.clone())
    }

    /// Nothing readable and every tool missing.
    pub fn bare() -> Self {
        Self::default()
    }

    /// A Debian-like server with procps, iproute2, net-tools, and coreutils.
    pub fn typical_linux() -> Self {
        let mut fs = MockFs::new();
        fs.add_file("/proc/uptime", "350735.47 1234567.89\n");
        fs.add_file(
            "/proc/cpuinfo",
            "\
processor\t: 0
vendor_id\t: GenuineIntel
model name\t: Intel(R) Xeon(R) CPU E5-2680 v4 @ 2.40GHz
cpu MHz\t\t: 2399.998
processor\t: 1
vendor_id\t: GenuineIntel
model name\t: Intel(R) Xeon(R) CPU E5-2680 v4 @ 2.40GHz
cpu MHz\t\t: 2399.998
",
        );
        fs.add_file(
            "/proc/meminfo",
            "MemTotal:       16384000 kB\nMemFree:         8192000 kB\nMemAvailable:   12000000 kB\n",
        );
        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  123456     100    0    0    0     0          0         0   123456     100    0    0    0     0       0          0
  eth0: 10485760    8000    0    0    0     0          0         0  2097152     5000    0    0    0     0       0          0
",
        );
        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 0 0 0 0
",
        );
        fs.add_file("/sys/class/thermal/thermal_zone0/type", "x86_pkg_temp\n");
        fs.add_file("/sys/class/thermal/thermal_zone0/temp", "47000\n");
        fs.add_process_status(1, "systemd", 'S');
        fs.add_process_status(812, "sshd", 'S');
        fs.add_process_status(4242, "cargo", 'R');

        let ps = "\
USER         PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND
user        4242 12.5  3.2 204800 51200 pts/0    R+   10:00   1:23 cargo build --release
root         812  0.1  0.1  15420  6144 ?        Ss   Jan01   0:02 sshd: /usr/sbin/sshd -D
root           1  0.0  0.1 167772 11264 ?        Ss   Jan01   0:05 /sbin/init
";
        let runner = MockRunner::new()
            .with_output("uptime", " 10:00:00 up 4 days,  1:25,  1 user,  load average: 0.15, 0.10, 0.05")
            .with_output("hostname", "build-01")
            .with_output("hostname -I", "10.0.0.5 172.17.0.1")
            .with_output("python --version", "Python 3.11.2")
            .with_output(
                "top -bn1",
                "\
top - 10:00:00 up 4 days,  1:25,  1 user,  load average: 0.15, 0.10, 0.05
Tasks: 3 total,   1 running,   2 sleeping,   0 stopped,   0 zombie
%Cpu(s):  6.3 us,  1.2 sy,  0.0 ni, 92.4 id,  0.1 wa,  0.0 hi,  0.0 si,  0.0 st
",
            )
            .with_output(
                "free -b",
                "\
               total        used        free      shared  buff/cache   available
Mem:     16777216000  4194304000  8388608000    10485760  4194304000 12000000000
Swap:     2147483648           0  2147483648
",
            )
            .with_output(
                "ip addr show eth0",
                "2: eth0: <BROADCAST,MULTICAST,UP>\n    inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0",
            )
            .with_output(
                "netstat -tuln",
                "\
Active Internet connections (only servers)
Proto Recv-Q Send-Q Local Address           Foreign Address         State
tcp        0      0 0.0.0.0:22              0.0.0.0:*               LISTEN
tcp        0      0 0.0.0.0:8080            0.0.0.0:*               LISTEN
udp        0      0 0.0.0.0:68              0.0.0.0:*
",
            )
            .with_output(
                "df -h .",
                "Filesystem      Size  Used Avail Use% Mounted on\n/dev/sda1       100G   30G   70G  30% /",
            )
            .with_output(
                "df -h",
                "\
Filesystem      Size  Used Avail Use% Mounted on
udev            7.8G     0  7.8G   0% /dev
tmpfs           1.6G  2.0M  1.6G   1% /run
/dev/sda1       100G   30G   70G  30% /
",
            )
            .with_output("ps aux", ps)
            .with_output("ps aux --sort=-pcpu,-pmem", ps);

        Self { fs, runner }
    }

    /// An Android phone running Termux with the Termux:API add-on.
    ///
    /// `/proc` is mostly hidden from apps, so most values come from
    /// `termux-*` tools and `getprop`.
    pub fn termux_device() -> Self {
        let mut fs = MockFs::new();
        fs.add_file("/proc/uptime", "90061.00 300000.00\n");
        fs.add_file(
            "/proc/cpuinfo",
            "processor\t: 0\nprocessor\t: 1\nprocessor\t: 2\nprocessor\t: 3\nHardware\t: Qualcomm Technologies, Inc SM8150\n",
        );
        fs.add_file(
            "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq",
            "1785600\n",
        );
        fs.add_file("/proc/meminfo", "MemTotal:        7812500 kB\nMemFree:          781250 kB\n");
        fs.add_file("/sys/class/power_supply/battery/temp", "301\n");

        let runner = MockRunner::new()
            .with_output("hostname", "localhost")
            .with_output(
                "ip addr",
                "1: lo: <LOOPBACK,UP>\n    inet 127.0.0.1/8 scope host lo\n30: wlan0: <UP>\n    inet 192.168.0.42/24 brd 192.168.0.255 scope global wlan0",
            )
            .with_output(
                "termux-battery-status",
                r#"{"health": "GOOD", "percentage": 87, "plugged": "UNPLUGGED", "status": "DISCHARGING", "temperature": 30.1, "current": -412000}"#,
            )
            .with_output(
                "termux-wifi-connectioninfo",
                r#"{"bssid": "aa:bb:cc:dd:ee:ff", "frequency_mhz": 5180, "ip": "192.168.0.42", "link_speed_mbps": 433, "rssi": -58, "ssid": "HomeNet"}"#,
            )
            .with_output(
                "termux-info",
                r#"{"DEVICE_MANUFACTURER": "samsung", "DEVICE_MODEL": "SM-G975F", "ANDROID_VERSION": "12", "ANDROID_SDK": "31"}"#,
            )
            .with_output(
                "termux-sensor -l",
                r#"[{"name": "Accelerometer", "type": 1, "vendor": "STMicro"}, {"name": "Light", "type": 5, "vendor": "AMS"}]"#,
            )
            .with_output(
                "termux-sensor -s accelerometer -n 1",
                r#"[{"values": [0.12, 9.79, 0.31]}]"#,
            )
            .with_output("termux-sensor -s light -n 1", r#"[{"values": [140.0]}]"#)
            .with_output(
                "df -h .",
                "Filesystem      Size  Used Avail Use% Mounted on\n/dev/fuse       110G   62G   48G  57% /storage/emulated",
            )
            .with_output(
                "mount",
                "/dev/block/dm-5 on /data type ext4 (rw,seclabel)\n/dev/fuse on /storage/emulated type fuse (rw)",
            )
            .with_output(
                "df -h /data",
                "Filesystem       Size  Used Avail Use% Mounted on\n/dev/block/dm-5  110G   62G   48G  57% /data",
            )
            .with_output(
                "ps aux",
                "\
USER         PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND
u0_a123    12001  4.0  1.1 2048000 90000 pts/0   S    09:00   0:10 /data/data/com.termux/files/usr/bin/bash
u0_a123    12050  0.0  0.4  10240  4096 pts/0    R    09:05   0:00 ps aux
",
            )
            .with_output(
                "top -b -n 1",
                "\
Tasks: 2 total,   1 running,   1 sleeping,   0 stopped,   0 zombie
  PID USER      PR  NI    VIRT    RES    SHR S  %CPU  %MEM     TIME+ COMMAND
12001 u0_a123   10 -10 2048000  90000  50000 S   4.0   1.1   0:10.00 bash
12050 u0_a123   10 -10   10240   4096   2048 R   0.0   0.4   0:00.01 top -b -n 1
",
            );

        Self { fs, runner }
    }
}
